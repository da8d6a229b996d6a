/// Module for the supported scheme instantiations
pub mod algorithms;
