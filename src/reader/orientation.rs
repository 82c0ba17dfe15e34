use crate::common::result::{DecodeResult, MetadataValue, ResultMetadataType};

// Orientation
// Engines may already have rotated the symbol internally and said so in the orientation entry.
// The reader's own rotations are added on top of it instead of overwriting it.
//------------------------------------------------------------------------------

/// Records `rotation_count` quarter turns counter-clockwise in the result's orientation entry,
/// normalized to `[0, 360)`.
pub fn reconcile_orientation(res: &mut DecodeResult, rotation_count: u32) {
    let applied = (rotation_count % 4) as i32 * 90;
    let deg = match res.orientation() {
        Some(existing) => (existing + applied).rem_euclid(360),
        None => applied,
    };
    res.put_metadata(ResultMetadataType::Orientation, MetadataValue::Int(deg));
}
