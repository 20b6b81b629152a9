#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use visage_calib as calib;

#[doc(inline)]
pub use visage_cloud as cloud;

#[doc(inline)]
pub use visage_rgbd as rgbd;

#[doc(inline)]
pub use visage_align as align;

#[doc(inline)]
pub use visage_mesh as mesh;
