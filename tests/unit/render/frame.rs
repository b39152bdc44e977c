use super::*;

fn checker(width: u32, height: u32) -> FrameRGBA {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let v = if (x + y) % 2 == 0 { 255 } else { 0 };
            data.extend_from_slice(&[v, 255 - v, 64, 255]);
        }
    }
    FrameRGBA {
        width,
        height,
        data,
        premultiplied: true,
    }
}

#[test]
fn png_keeps_rgb_pixels() {
    let frame = checker(6, 4);
    let rendered = RenderedFrame::from_rgba(&frame).unwrap();
    assert_eq!(&rendered.png[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!((rendered.width, rendered.height), (6, 4));
    assert_eq!(rendered.decode_rgb().unwrap(), frame.to_rgb8());
}

#[test]
fn wrong_buffer_size_is_rejected() {
    let mut frame = checker(4, 4);
    frame.data.pop();
    assert!(RenderedFrame::from_rgba(&frame).is_err());
}

#[test]
fn pixel_lookup_is_bounds_checked() {
    let frame = checker(3, 2);
    assert_eq!(frame.pixel(0, 0), Some([255, 0, 64, 255]));
    assert_eq!(frame.pixel(1, 0), Some([0, 255, 64, 255]));
    assert_eq!(frame.pixel(3, 0), None);
    assert_eq!(frame.pixel(0, 2), None);
}

#[test]
fn corrupt_png_fails_to_decode() {
    let rendered = RenderedFrame {
        width: 2,
        height: 2,
        png: b"not a png".to_vec(),
    };
    assert!(rendered.decode_rgb().is_err());
}
