use std::borrow::Cow;

use mmdisplay_codec::{
    from_processor, image_from_source, to_processor, to_processor_copied,
    to_processor_single_component, CodecError, CopyPolicy, Processor, ProcessorPixels,
    ProcessorSource, ProcessorVariant,
};
use mmdisplay_pixels::{create_image, Coords, Image, Metadata};

fn image(bytes: &[u8], width: u32, height: u32, bytes_per_pixel: i32, num_components: i32) -> Image {
    create_image(
        bytes,
        width,
        height,
        bytes_per_pixel,
        num_components,
        Coords::new().with("channel", 1).with("time", 7),
        Metadata::new().with("Camera", "DemoCam"),
    )
    .expect("valid test image")
}

fn ramp(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 37 + 11) as u8).collect()
}

#[test]
fn grayscale_round_trip() {
    for (bytes_per_pixel, variant) in [
        (1, ProcessorVariant::Mono8),
        (2, ProcessorVariant::Mono16),
        (4, ProcessorVariant::MonoFloat32),
    ] {
        let source = image(&ramp(6 * 5 * bytes_per_pixel as usize), 6, 5, bytes_per_pixel, 1);

        for policy in [CopyPolicy::Alias, CopyPolicy::Copy] {
            let processor = to_processor(&source, policy).unwrap();
            assert_eq!(processor.variant(), variant);
            assert_eq!((processor.width(), processor.height()), (6, 5));

            let back = from_processor(
                &processor,
                source.coords().clone(),
                source.metadata().clone(),
            )
            .unwrap();
            assert_eq!(back, source, "{variant:?} with {policy:?}");
        }
    }
}

#[test]
fn color_round_trip_loses_last_byte() {
    let bytes = ramp(3 * 2 * 4);
    let source = image(&bytes, 3, 2, 4, 3);

    let processor = to_processor(&source, CopyPolicy::Copy).unwrap();
    let back = from_processor(&processor, Coords::new(), Metadata::new()).unwrap();

    let last = bytes.len() - 1;
    assert_ne!(bytes[last], 0);
    assert_eq!(back.buffer()[..last], bytes[..last]);
    assert_eq!(back.buffer()[last], 0);
    assert_eq!((back.bytes_per_pixel(), back.num_components()), (4, 3));
}

#[test]
fn color_shift_is_exact() {
    let bytes = [0xb0, 0xb1, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, 0xb7];
    let source = image(&bytes, 2, 1, 4, 3);

    let processor = to_processor(&source, CopyPolicy::Alias).unwrap();
    let packed = match processor.pixels() {
        ProcessorPixels::PackedColor32(px) => px.clone(),
        other => panic!("expected packed color, got {other:?}"),
    };

    let packed_bytes: Vec<u8> = packed.iter().flat_map(|px| px.to_be_bytes()).collect();
    assert_eq!(packed_bytes, [0, 0xb0, 0xb1, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6]);
}

#[test]
fn single_component_extraction() {
    let source = image(&[0x10, 0x20, 0x30, 0x99], 1, 1, 4, 3);

    for (component, expected) in [(0, 0x10), (1, 0x20), (2, 0x30)] {
        let processor = to_processor_single_component(&source, component).unwrap();
        assert_eq!(processor.variant(), ProcessorVariant::Mono8);
        assert_eq!(
            processor.pixels(),
            &ProcessorPixels::Mono8(Cow::Owned(vec![expected]))
        );
    }

    assert!(matches!(
        to_processor_single_component(&source, 3),
        Err(CodecError::UnsupportedLayout { .. })
    ));
}

#[test]
fn single_component_of_grayscale_ignores_index() {
    let source = image(&ramp(8), 2, 2, 2, 1);
    let whole = to_processor_copied(&source).unwrap();

    for component in [0, 2, 17] {
        assert_eq!(to_processor_single_component(&source, component).unwrap(), whole);
    }
}

#[test]
fn unsupported_layouts_fail() {
    let source = image(&[1, 2, 3, 4], 2, 1, 2, 3);

    for policy in [CopyPolicy::Alias, CopyPolicy::Copy] {
        assert_eq!(
            to_processor(&source, policy),
            Err(CodecError::UnsupportedLayout {
                bytes_per_pixel: 2,
                num_components: 3,
                buffer_kind: "u8",
            })
        );
    }
    assert!(matches!(
        to_processor_single_component(&source, 0),
        Err(CodecError::UnsupportedLayout {
            bytes_per_pixel: 2,
            num_components: 3,
            ..
        })
    ));

    let source = image(&[1, 2], 2, 1, 1, 3);
    assert!(to_processor(&source, CopyPolicy::Copy).is_err());
}

#[test]
fn copied_processor_outlives_image() {
    let processor = {
        let source = image(&ramp(4), 2, 2, 1, 1);
        to_processor_copied(&source).unwrap()
    };

    assert_eq!(processor.pixels().len(), 4);
}

struct LookupTable;

impl ProcessorSource for LookupTable {
    fn type_name(&self) -> &str {
        "IndexedLookupTable"
    }

    fn processor(&self) -> Option<Processor<'_>> {
        None
    }
}

#[test]
fn unrecognized_source_is_an_error() {
    assert_eq!(
        image_from_source(&LookupTable, Coords::new(), Metadata::new()),
        Err(CodecError::UnrecognizedProcessorType("IndexedLookupTable".into()))
    );
}

#[test]
fn known_source_converts() {
    let processor = Processor::new(1, 2, ProcessorPixels::Mono16(Cow::Owned(vec![7, 9]))).unwrap();
    assert_eq!(processor.type_name(), "Mono16");

    let image = image_from_source(&processor, Coords::new(), Metadata::new()).unwrap();
    assert_eq!((image.width(), image.height()), (1, 2));
    assert_eq!(image.buffer(), ne_bytes(&[7, 9]));
}

fn ne_bytes(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_ne_bytes()).collect()
}
