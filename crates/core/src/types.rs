/// Product identifiers are server-assigned integers.
pub type DbId = i64;
