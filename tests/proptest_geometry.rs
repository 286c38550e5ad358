use proptest::prelude::*;

use regionkit::geom::{rotated_envelope, BBox, Canvas, ItemViewport};
use regionkit::region::{MaskBitmap, RleMask};

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn coordinate_conversion_is_invertible(
        extent in 1u32..10_000,
        value in -10_000.0f64..10_000.0,
    ) {
        let viewport = ItemViewport::new(extent, extent);
        let there = viewport.to_norm_x(value);
        let back = viewport.to_canvas_x(there);

        // Tolerance scales with the magnitude of the value.
        let eps = 1e-9 * value.abs().max(1.0);
        prop_assert!((back - value).abs() <= eps, "{back} != {value}");
    }

    #[test]
    fn four_quarter_turns_restore_the_bbox(
        left in 0.0f64..500.0,
        top in 0.0f64..500.0,
        width in 0.1f64..300.0,
        height in 0.1f64..300.0,
    ) {
        let original: BBox<Canvas> = BBox::from_ltrb(left, top, left + width, top + height);
        let pivot = original.center();

        let mut bbox = original;
        for _ in 0..4 {
            bbox = rotated_envelope(bbox, 90.0, pivot);
        }

        let eps = 1e-9 * (left + top + width + height).max(1.0);
        prop_assert!((bbox.left() - original.left()).abs() <= eps);
        prop_assert!((bbox.top() - original.top()).abs() <= eps);
        prop_assert!((bbox.right() - original.right()).abs() <= eps);
        prop_assert!((bbox.bottom() - original.bottom()).abs() <= eps);
    }

    #[test]
    fn envelope_never_shrinks_below_the_rotated_box_diagonal(
        size in 0.1f64..100.0,
        rotation in 0.0f64..360.0,
    ) {
        // The envelope of any rotation of a square contains the square's
        // extent in both axes.
        let bbox: BBox<Canvas> = BBox::from_ltrb(0.0, 0.0, size, size);
        let out = rotated_envelope(bbox, rotation, bbox.center());

        prop_assert!(out.width() >= size - 1e-9);
        prop_assert!(out.height() >= size - 1e-9);
    }

    #[test]
    fn rle_roundtrip_restores_the_bitmap(
        width in 1u32..32,
        height in 1u32..32,
        seed in proptest::collection::vec(any::<bool>(), 0..1024),
    ) {
        let mut bitmap = MaskBitmap::new(width, height);
        for (i, value) in seed.iter().take(bitmap.data.len()).enumerate() {
            bitmap.data[i] = *value;
        }

        let rle = RleMask::encode(&bitmap);
        let decoded = rle.decode(width, height).expect("runs cover the grid");
        prop_assert_eq!(&decoded, &bitmap);

        let expected_set = bitmap.data.iter().filter(|&&b| b).count() as u64;
        prop_assert_eq!(rle.set_count(), expected_set);
    }

    #[test]
    fn rle_pixel_walk_matches_decoded_bitmap(
        width in 1u32..16,
        height in 1u32..16,
        seed in proptest::collection::vec(any::<bool>(), 0..256),
    ) {
        let mut bitmap = MaskBitmap::new(width, height);
        for (i, value) in seed.iter().take(bitmap.data.len()).enumerate() {
            bitmap.data[i] = *value;
        }
        let rle = RleMask::encode(&bitmap);

        for y in 0..height {
            for x in 0..width {
                prop_assert_eq!(rle.pixel(x, y, width), bitmap.get(x, y));
            }
        }
    }
}
