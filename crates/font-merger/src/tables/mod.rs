//! Table-specific reading and rebuilding

pub mod cmap;
pub(crate) mod glyf;
pub(crate) mod head;
pub(crate) mod hmtx;
pub(crate) mod maxp;
pub(crate) mod os2;
pub(crate) mod post;
