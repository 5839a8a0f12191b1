use image::{DynamicImage, ImageError};

/// Which MusicBrainz entity the Cover Art Archive served the image for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverEntity {
    Release,
    ReleaseGroup,
}

impl CoverEntity {
    /// Path segment used by the Cover Art Archive.
    pub fn path_segment(self) -> &'static str {
        match self {
            CoverEntity::Release => "release",
            CoverEntity::ReleaseGroup => "release-group",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CoverEntity::Release => "release",
            CoverEntity::ReleaseGroup => "release group",
        }
    }
}

/// A decoded cover image together with the bytes it was decoded from.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverArt {
    pub entity: CoverEntity,
    pub mbid: String,
    pub source_url: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub image: DynamicImage,
}

impl CoverArt {
    pub fn decode(
        entity: CoverEntity,
        mbid: impl Into<String>,
        source_url: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, ImageError> {
        let image = image::load_from_memory(&bytes)?;
        Ok(Self {
            entity,
            mbid: mbid.into(),
            source_url: source_url.into(),
            mime: mime.into(),
            width: image.width(),
            height: image.height(),
            bytes,
            image,
        })
    }

    /// File extension matching the encoded bytes, falling back to `jpg`
    /// which is what the Cover Art Archive serves for most releases.
    pub fn extension(&self) -> &'static str {
        image::guess_format(&self.bytes)
            .ok()
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("jpg")
    }

    pub fn dimensions_label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// e.g. `release group 1b022e01-...`
    pub fn source_label(&self) -> String {
        format!("{} {}", self.entity.label(), self.mbid)
    }
}

#[cfg(test)]
pub fn encoded_sample(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 40) as u8, (y * 40) as u8, 128])
    }));
    let mut cursor = std::io::Cursor::new(Vec::new());
    image.write_to(&mut cursor, format).unwrap();
    cursor.into_inner()
}

#[cfg(test)]
pub fn sample(release_id: &str) -> CoverArt {
    CoverArt::decode(
        CoverEntity::Release,
        release_id,
        format!("https://coverartarchive.org/release/{release_id}/front"),
        "image/png",
        encoded_sample(4, 3, image::ImageFormat::Png),
    )
    .unwrap()
}
