mod versioned_schema;

pub use versioned_schema::{
    apply_schemas, open_versioned, read_version, Column, SqlType, Table, VersionedSchema,
    BASE_DB_VERSION,
};
