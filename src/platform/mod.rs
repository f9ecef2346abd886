pub(crate) mod bitmap;
pub(crate) mod dom;
pub(crate) mod draw;
