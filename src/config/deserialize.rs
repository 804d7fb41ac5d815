// ABOUTME: Custom serde deserializers for manifest types.
// ABOUTME: Turns the image list into a validated non-empty list.

use nonempty::NonEmpty;
use serde::Deserialize;

use super::ImageResource;

pub fn deserialize_images<'de, D>(deserializer: D) -> Result<NonEmpty<ImageResource>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let images: Vec<ImageResource> = Vec::deserialize(deserializer)?;

    for image in &images {
        image.validate().map_err(serde::de::Error::custom)?;
    }

    NonEmpty::from_vec(images)
        .ok_or_else(|| serde::de::Error::custom("at least one image is required"))
}
