/// Defines the attribute store.
pub mod attribute;

/// Defines the mesh and the mesh builder.
pub mod mesh;

/// Defines the corner table, the adjacency structure used by the connectivity coders.
pub mod corner_table;

/// Byte and bit level readers and writers.
pub mod bit_coder;

/// Index types and the configuration trait.
pub mod shared;
