pub mod callback;
#[cfg(any(feature = "native", feature = "wasm-js"))]
pub(crate) mod sleep;
