//! Benchmarks conversions between acquisition images and processors.
use brunch::Bench;

use mmdisplay_codec::{from_processor, to_processor, CodecError, CopyPolicy};
use mmdisplay_pixels::{create_image, Coords, Metadata};

#[derive(Debug)]
struct Convert {
    bytes_per_pixel: i32,
    num_components: i32,
    policy: CopyPolicy,
    sz: u32,
}

impl Convert {
    fn name(&self) -> String {
        format!(
            "convert({}x{}, {:?}, {})",
            self.bytes_per_pixel, self.num_components, self.policy, self.sz
        )
    }

    fn prepare(&self) -> Result<impl FnMut(), CodecError> {
        let len = (self.sz * self.sz) as usize * self.bytes_per_pixel as usize;
        let bytes: Vec<u8> = (0..len).map(|i| i as u8).collect();
        let image = create_image(
            &bytes,
            self.sz,
            self.sz,
            self.bytes_per_pixel,
            self.num_components,
            Coords::new(),
            Metadata::new(),
        )?;
        let policy = self.policy;

        Ok(move || {
            let processor = to_processor(&image, policy).unwrap();
            from_processor(&processor, Coords::new(), Metadata::new()).unwrap();
        })
    }
}

fn main() {
    let tests = [
        Convert {
            bytes_per_pixel: 1,
            num_components: 1,
            policy: CopyPolicy::Alias,
            sz: 512,
        },
        Convert {
            bytes_per_pixel: 2,
            num_components: 1,
            policy: CopyPolicy::Alias,
            sz: 512,
        },
        Convert {
            bytes_per_pixel: 2,
            num_components: 1,
            policy: CopyPolicy::Copy,
            sz: 512,
        },
        Convert {
            bytes_per_pixel: 4,
            num_components: 1,
            policy: CopyPolicy::Copy,
            sz: 512,
        },
        /* the byte-plane shift */
        Convert {
            bytes_per_pixel: 4,
            num_components: 3,
            policy: CopyPolicy::Copy,
            sz: 512,
        },
        Convert {
            bytes_per_pixel: 4,
            num_components: 3,
            policy: CopyPolicy::Copy,
            sz: 2048,
        },
    ];

    let mut benches = brunch::Benches::default();
    benches.extend(tests.map(|convert| {
        Bench::new(format!("codec::conversion::{}", convert.name()))
            .run(convert.prepare().expect("Failed to setup benchmark"))
    }));
    benches.finish();
}
