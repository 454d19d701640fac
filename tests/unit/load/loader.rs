use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

use super::*;
use crate::catalog::frames::FrameCategory;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Serves canned responses keyed by the reference's display form and records every call.
#[derive(Default)]
struct CannedFetcher {
    responses: HashMap<String, Result<Vec<u8>, String>>,
    calls: Mutex<Vec<(String, FetchMode)>>,
}

impl CannedFetcher {
    fn serve(mut self, key: &str, bytes: Vec<u8>) -> Self {
        self.responses.insert(key.to_string(), Ok(bytes));
        self
    }

    fn fail(mut self, key: &str, msg: &str) -> Self {
        self.responses.insert(key.to_string(), Err(msg.to_string()));
        self
    }

    fn calls(&self) -> Vec<(String, FetchMode)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetcher for CannedFetcher {
    async fn fetch(&self, image: &ImageRef, mode: FetchMode) -> StudioResult<Vec<u8>> {
        let key = image.to_string();
        self.calls.lock().unwrap().push((key.clone(), mode));
        match self.responses.get(&key) {
            Some(Ok(bytes)) => Ok(bytes.clone()),
            Some(Err(msg)) => Err(StudioError::Other(anyhow::anyhow!("{msg}"))),
            None => Err(StudioError::Other(anyhow::anyhow!("GET {key} returned 404"))),
        }
    }
}

fn frame(url: &str) -> FrameDescriptor {
    FrameDescriptor {
        id: "f1".to_string(),
        name: "Frame".to_string(),
        category: FrameCategory::Minimal,
        url: url.to_string(),
    }
}

#[tokio::test]
async fn loads_source_then_frame_anonymously() {
    let fetcher = CannedFetcher::default()
        .serve("photo.jpg", png_bytes(8, 12))
        .serve("frames/f1.png", png_bytes(4, 4));
    let loader = ResourceLoader::new(fetcher);

    let loaded = loader
        .load(
            &ImageRef::parse("photo.jpg").unwrap(),
            Some(&frame("frames/f1.png")),
        )
        .await
        .unwrap();

    assert_eq!(loaded.source.dimensions(), (8, 12));
    assert_eq!(loaded.frame.as_ref().unwrap().dimensions(), (4, 4));
    assert_eq!(
        loader.fetcher().calls(),
        vec![
            ("photo.jpg".to_string(), FetchMode::Credentialed),
            ("frames/f1.png".to_string(), FetchMode::Anonymous),
        ]
    );
}

#[tokio::test]
async fn no_frame_loads_only_the_source() {
    let loader = ResourceLoader::new(CannedFetcher::default().serve("photo.jpg", png_bytes(3, 2)));
    let loaded = loader
        .load(&ImageRef::parse("photo.jpg").unwrap(), None)
        .await
        .unwrap();
    assert!(loaded.frame.is_none());
    assert_eq!(loader.fetcher().calls().len(), 1);
}

#[tokio::test]
async fn frame_404_is_attributed_to_the_frame() {
    let loader = ResourceLoader::new(CannedFetcher::default().serve("photo.jpg", png_bytes(3, 2)));
    let err = loader
        .load(
            &ImageRef::parse("photo.jpg").unwrap(),
            Some(&frame("frames/missing.png")),
        )
        .await
        .unwrap_err();

    assert_eq!(err.resource_role(), Some(ResourceRole::Frame));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn source_failure_never_requests_the_frame() {
    let fetcher = CannedFetcher::default()
        .fail("photo.jpg", "connection reset")
        .serve("frames/f1.png", png_bytes(4, 4));
    let loader = ResourceLoader::new(fetcher);
    let err = loader
        .load(
            &ImageRef::parse("photo.jpg").unwrap(),
            Some(&frame("frames/f1.png")),
        )
        .await
        .unwrap_err();

    assert_eq!(err.resource_role(), Some(ResourceRole::Source));
    assert_eq!(loader.fetcher().calls().len(), 1);
}

#[tokio::test]
async fn undecodable_bytes_fail_as_decode_errors() {
    let fetcher = CannedFetcher::default()
        .serve("photo.jpg", png_bytes(2, 2))
        .serve("frames/f1.png", b"<html>not found</html>".to_vec());
    let loader = ResourceLoader::new(fetcher);
    let err = loader
        .load(
            &ImageRef::parse("photo.jpg").unwrap(),
            Some(&frame("frames/f1.png")),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StudioError::ResourceDecode {
            which: ResourceRole::Frame,
            ..
        }
    ));
}

#[tokio::test]
async fn relative_frame_urls_resolve_against_base_dir() {
    let fetcher = CannedFetcher::default()
        .serve("photo.jpg", png_bytes(2, 2))
        .serve("/srv/assets/frames/f1.png", png_bytes(4, 4));
    let loader = ResourceLoader::new(fetcher).with_frame_base_dir("/srv/assets");
    loader
        .load(
            &ImageRef::parse("photo.jpg").unwrap(),
            Some(&frame("frames/f1.png")),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn load_refs_takes_frames_by_reference() {
    let fetcher = CannedFetcher::default()
        .serve("photo.jpg", png_bytes(2, 2))
        .serve("overlay.png", png_bytes(6, 3));
    let loader = ResourceLoader::new(fetcher);
    let loaded = loader
        .load_refs(
            &ImageRef::parse("photo.jpg").unwrap(),
            Some(&ImageRef::parse("overlay.png").unwrap()),
        )
        .await
        .unwrap();
    assert_eq!(loaded.frame.unwrap().dimensions(), (6, 3));
}
