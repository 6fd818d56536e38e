mod sprites;
mod spritesheet;
mod upload;

pub use sprites::{DeviceTextureId, SpriteCache, SpriteEntry, TextureId, UvRect};
pub use spritesheet::{parse_sheet_descriptor, SheetDescriptor, SheetImage};
pub use upload::{SoftwareTextureDevice, TextureDevice, UploadJob};

pub const IMAGES_DIR: &str = "images";
pub const PORTRAITS_DIR: &str = "portraits";
pub const PNG_EXTENSION: &str = ".png";
pub const JPEG_EXTENSION: &str = ".jpg";
pub const SPRITESHEET_EXTENSION: &str = ".spritesheet";

/// Resource key for a sprite id: `images/<id>.png`.
pub fn image_key(id: &str) -> String {
    format!("{IMAGES_DIR}/{id}{PNG_EXTENSION}")
}

/// Resource key for the JPEG fallback: `images/<id>.jpg`.
pub fn image_key_jpeg(id: &str) -> String {
    format!("{IMAGES_DIR}/{id}{JPEG_EXTENSION}")
}

/// Resource key for a portrait id: `portraits/<id>.png`.
pub fn portrait_key(id: &str) -> String {
    format!("{PORTRAITS_DIR}/{id}{PNG_EXTENSION}")
}
