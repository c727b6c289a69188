pub mod png_codec;

pub use png_codec::{decode_png, encode_mask_png, encode_rgb_png, optimize_png, MAX_PIXELS};
