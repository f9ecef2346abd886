//! Layers, the stack that orders them, and the per-host registry.

pub(crate) mod callbacks;
pub(crate) mod canvas;
pub(crate) mod dom;
pub(crate) mod kind;
pub(crate) mod layer;
pub(crate) mod registry;
pub(crate) mod stack;
pub(crate) mod surface;
