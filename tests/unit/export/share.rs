use std::sync::Mutex;

use super::*;
use crate::compose::raster::Surface;
use crate::encode::jpeg::{JPEG_QUALITY, encode_jpeg};
use crate::foundation::core::CanvasSize;

fn artifact() -> CompositedArtifact {
    let s = Surface::new(CanvasSize {
        width: 2,
        height: 2,
    })
    .unwrap();
    encode_jpeg(&s, JPEG_QUALITY).unwrap()
}

#[derive(Default)]
struct RecordingTarget {
    fail: bool,
    shared: Mutex<Vec<ShareFile>>,
}

impl ShareTarget for RecordingTarget {
    fn can_share_files(&self, file: &ShareFile) -> bool {
        file.mime == "image/jpeg"
    }

    async fn share(&self, file: ShareFile) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("user dismissed the sheet");
        }
        self.shared.lock().unwrap().push(file);
        Ok(())
    }
}

#[tokio::test]
async fn unsupported_target_reports_share_unsupported() {
    let adapter = ShareAdapter::new(NoShareTarget);
    let err = adapter.share(&artifact()).await.unwrap_err();
    assert_eq!(err.export_kind(), Some(ExportErrorKind::ShareUnsupported));
    assert!(err.to_string().contains(SHARE_UNSUPPORTED_MESSAGE));
    assert!(!err.is_terminal_for_composite());
}

#[tokio::test]
async fn supported_target_receives_a_jpeg_file() {
    let adapter = ShareAdapter::new(RecordingTarget::default());
    let art = artifact();
    assert_eq!(adapter.share(&art).await.unwrap(), ExportOutcome::Done(()));

    let shared = adapter.target.shared.lock().unwrap();
    assert_eq!(shared.len(), 1);
    assert!(shared[0].file_name.starts_with("star-photo-"));
    assert!(shared[0].file_name.ends_with(".jpg"));
    assert_eq!(shared[0].title, "My Star Photo");
    assert_eq!(shared[0].artifact, art);
}

#[tokio::test]
async fn target_failure_is_share_failed_and_retryable() {
    let adapter = ShareAdapter::new(RecordingTarget {
        fail: true,
        ..Default::default()
    });
    let art = artifact();
    let err = adapter.share(&art).await.unwrap_err();
    assert_eq!(err.export_kind(), Some(ExportErrorKind::ShareFailed));
    // The guard was released; a retry runs again.
    assert!(adapter.share(&art).await.is_err());
    assert!(!adapter.in_flight.is_busy());
}

#[tokio::test]
async fn concurrent_share_is_ignored() {
    let adapter = ShareAdapter::new(RecordingTarget::default());
    let _held = adapter.in_flight.try_begin().unwrap();
    assert!(adapter.share(&artifact()).await.unwrap().is_busy());
    assert!(adapter.target.shared.lock().unwrap().is_empty());
}
