mod bucket;
mod path_prefix;

pub use bucket::{
    BucketNameResolver, BucketNameResolverKind, PersistenceIdBucketNameResolver,
    ShardedBucketNameResolver, StaticBucketNameResolver,
};
pub use path_prefix::{
    EntityTypePathPrefixResolver, NoPathPrefixResolver, PathPrefixResolver,
    PathPrefixResolverKind, StaticPathPrefixResolver,
};
