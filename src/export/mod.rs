pub(crate) mod composite;
pub(crate) mod compositor;
pub(crate) mod encode;
pub(crate) mod hint;
pub(crate) mod options;
