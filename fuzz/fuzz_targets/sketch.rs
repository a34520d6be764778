#![no_main]

use cardinality_sketch::{AtomicSketch, Sketch};
use libfuzzer_sys::fuzz_target;
use wyhash::wyhash;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let precision = (wyhash(data, 0) % 20) as u8;
    let mut sketch = Sketch::new(precision);
    let atomic = AtomicSketch::new(precision);

    for chunk in data.chunks(4) {
        let mut bytes = [0u8; 4];
        bytes[..chunk.len()].copy_from_slice(chunk);
        let digest = u32::from_le_bytes(bytes);

        sketch.add(digest);
        atomic.add(digest);

        let estimate = sketch.estimate();
        assert!(estimate.is_finite());
        assert!(estimate > 0.0);
    }

    assert!(sketch.registers().iter().all(|&r| r <= sketch.max_rank()));
    assert_eq!(atomic.snapshot(), sketch);
});
