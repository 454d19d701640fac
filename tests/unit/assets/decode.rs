use std::io::Cursor;

use super::*;

fn png_bytes(width: u32, height: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let bitmap = decode_image(&png_bytes(3, 2, [100, 50, 200, 128])).unwrap();
    assert_eq!(bitmap.dimensions(), (3, 2));
    assert_eq!(
        bitmap.pixel(2, 1),
        [
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(format!("{err:#}").contains("decode image"));
}

#[test]
fn svg_frames_rasterize_at_intrinsic_size() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4">
        <rect x="0" y="0" width="8" height="4" fill="#ff0000"/>
    </svg>"##;
    let bitmap = decode_resource(svg).unwrap();
    assert_eq!(bitmap.dimensions(), (8, 4));
    assert_eq!(bitmap.pixel(4, 2), [255, 0, 0, 255]);
}

#[test]
fn svg_sniffing_handles_xml_prolog_and_bom() {
    assert!(looks_like_svg(b"\xEF\xBB\xBF  <svg></svg>"));
    assert!(looks_like_svg(
        b"<?xml version=\"1.0\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\"/>"
    ));
    assert!(!looks_like_svg(&png_bytes(1, 1, [0, 0, 0, 255])));
}

#[test]
fn from_premul_checks_length() {
    assert!(Bitmap::from_premul(2, 2, vec![0; 16]).is_ok());
    assert!(Bitmap::from_premul(2, 2, vec![0; 15]).is_err());
}

#[test]
fn svg_after_generator_comment_is_rasterized() {
    let svg = br##"<?xml version="1.0" encoding="UTF-8"?>
<!-- Generator: Adobe Illustrator 27.0.0, SVG Export Plug-In -->
<svg xmlns="http://www.w3.org/2000/svg" width="90" height="160">
  <rect x="0" y="0" width="90" height="160" fill="#00ff00"/>
</svg>"##;
    let bitmap = decode_resource(svg).unwrap();
    assert_eq!(bitmap.dimensions(), (90, 160));
    assert_eq!(bitmap.pixel(45, 80), [0, 255, 0, 255]);
}

#[test]
fn svg_after_doctype_is_rasterized() {
    let svg = br##"<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg" width="90" height="160">
  <rect x="0" y="0" width="90" height="160" fill="#0000ff"/>
</svg>"##;
    let bitmap = decode_resource(svg).unwrap();
    assert_eq!(bitmap.dimensions(), (90, 160));
    assert_eq!(bitmap.pixel(10, 10), [0, 0, 255, 255]);
}

#[test]
fn svg_sniffing_stops_at_other_root_elements() {
    assert!(!looks_like_svg(b"<!-- x --><html><svg></svg></html>"));
    assert!(!looks_like_svg(b"<!-- unterminated <svg"));
    assert!(looks_like_svg(b"<!DOCTYPE svg><!-- a --><?pi x?>\n<svg/>"));
    assert!(looks_like_svg(
        b"<!DOCTYPE svg [ <!ENTITY a \"b\"> ]>\n<svg/>"
    ));
}

#[test]
fn bitmap_accessors_expose_checked_buffer() {
    let b = Bitmap::from_premul(3, 1, vec![9; 12]).unwrap();
    assert_eq!((b.width(), b.height()), (3, 1));
    assert_eq!(b.data().len(), 12);
    assert!(Bitmap::from_premul(3, 1, vec![9; 8]).is_err());
}
