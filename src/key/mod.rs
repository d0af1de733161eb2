mod converter;

pub use converter::{DefaultKeyConverter, KeyConverter, KeyConverterKind};
