//! Export: render every filled slide, then share the files or bundle them in a zip.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::deck::{Deck, RenderConfig};
use crate::error::SlideError;
use crate::ports::{ExportFile, ShareOutcome, ShareTarget};
use crate::render::{self, FontBook};

/// Archive name used when none is given.
pub const DEFAULT_ARCHIVE_NAME: &str = "carosello_ig.zip";

/// How an export ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The share target took this many files.
    Shared(usize),
    /// The user dismissed the share sheet.
    Cancelled,
    /// No share target was usable, so the files went into an archive.
    Archived {
        /// Where the archive was written.
        path: PathBuf,
        /// Number of slides in it.
        count: usize,
    },
}

/// Render and encode every filled slide, named in order.
///
/// # Errors
///
/// Returns an error if the deck has no filled slides or encoding fails.
pub fn render_files(
    deck: &Deck,
    config: &RenderConfig,
    fonts: &FontBook,
) -> Result<Vec<ExportFile>, SlideError> {
    let files = deck
        .filled()
        .enumerate()
        .map(|(i, slide)| {
            let data = render::render_jpeg(&slide.text, &config.style_for(slide), fonts)?;
            Ok(ExportFile::slide(i, data))
        })
        .collect::<Result<Vec<_>, SlideError>>()?;

    if files.is_empty() {
        return Err(SlideError::InvalidArgument("Add at least one phrase".into()));
    }
    Ok(files)
}

/// Bundle files into an in-memory zip. JPEG data is stored, not deflated.
///
/// # Errors
///
/// Returns an error if the archive cannot be written.
pub fn build_archive(files: &[ExportFile]) -> Result<Vec<u8>, SlideError> {
    let archive_err = |e: zip::result::ZipError| SlideError::Archive(e.to_string());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for file in files {
        writer.start_file(file.name.as_str(), options).map_err(archive_err)?;
        writer.write_all(&file.data)?;
    }
    Ok(writer.finish().map_err(archive_err)?.into_inner())
}

/// Write files into a directory, returning their paths.
///
/// # Errors
///
/// Returns an error if the directory or a file cannot be written.
pub fn write_files(files: &[ExportFile], dir: &Path) -> Result<Vec<PathBuf>, SlideError> {
    std::fs::create_dir_all(dir)?;
    files
        .iter()
        .map(|file| {
            let path = dir.join(&file.name);
            std::fs::write(&path, &file.data)?;
            Ok(path)
        })
        .collect()
}

/// Render the deck and hand it off.
///
/// This is deliberately synchronous: the share call follows image encoding with no
/// suspension point in between, which some share integrations require.
///
/// # Errors
///
/// Returns an error for an empty deck, an encoding failure, a share failure other
/// than cancellation, or an archive that cannot be written.
pub fn export_deck(
    deck: &Deck,
    config: &RenderConfig,
    fonts: &FontBook,
    share: Option<&dyn ShareTarget>,
    archive_path: &Path,
) -> Result<ExportOutcome, SlideError> {
    let files = render_files(deck, config, fonts)?;

    if let Some(target) = share.filter(|t| t.is_available(&files)) {
        return match target.share(&files)? {
            ShareOutcome::Shared => Ok(ExportOutcome::Shared(files.len())),
            ShareOutcome::Cancelled => Ok(ExportOutcome::Cancelled),
        };
    }

    let archive = build_archive(&files)?;
    if let Some(parent) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(archive_path, archive)?;
    tracing::debug!(path = %archive_path.display(), count = files.len(), "wrote archive");
    Ok(ExportOutcome::Archived { path: archive_path.to_path_buf(), count: files.len() })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use zip::ZipArchive;

    use super::*;

    struct FakeShare {
        available: bool,
        outcome: Result<ShareOutcome, String>,
        received: Mutex<Vec<String>>,
    }

    impl FakeShare {
        fn new(available: bool, outcome: Result<ShareOutcome, String>) -> Self {
            Self { available, outcome, received: Mutex::new(vec![]) }
        }
    }

    impl ShareTarget for FakeShare {
        fn is_available(&self, _files: &[ExportFile]) -> bool {
            self.available
        }

        fn share(&self, files: &[ExportFile]) -> Result<ShareOutcome, SlideError> {
            self.received.lock().unwrap().extend(files.iter().map(|f| f.name.clone()));
            self.outcome.clone().map_err(SlideError::Export)
        }
    }

    fn names_in(bytes: Vec<u8>) -> Vec<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len()).map(|i| archive.by_index(i).unwrap().name().to_string()).collect()
    }

    fn temp_archive(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join("carosello_export_test").join(name);
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn only_filled_slides_are_rendered() {
        let deck = Deck::from_phrases(&["uno", "", "due", "  "]);
        let files = render_files(&deck, &RenderConfig::default(), &FontBook::builtin()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["slide_01.jpg", "slide_02.jpg"]);
        assert!(files.iter().all(|f| f.data.starts_with(&[0xFF, 0xD8])));
    }

    #[test]
    fn empty_deck_is_rejected() {
        let deck = Deck::new();
        let err = render_files(&deck, &RenderConfig::default(), &FontBook::builtin()).unwrap_err();
        assert!(err.to_string().contains("Add at least one phrase"));
    }

    #[test]
    fn archive_contains_numbered_slides() {
        let files: Vec<ExportFile> =
            (0..3).map(|i| ExportFile::slide(i, vec![i as u8; 4])).collect();
        let names = names_in(build_archive(&files).unwrap());
        assert_eq!(names, vec!["slide_01.jpg", "slide_02.jpg", "slide_03.jpg"]);
    }

    #[test]
    fn no_share_target_falls_back_to_archive() {
        let deck = Deck::from_phrases(&["a", "b", "c"]);
        let path = temp_archive("fallback.zip");

        let outcome =
            export_deck(&deck, &RenderConfig::default(), &FontBook::builtin(), None, &path)
                .unwrap();
        assert_eq!(outcome, ExportOutcome::Archived { path: path.clone(), count: 3 });
        assert_eq!(
            names_in(std::fs::read(&path).unwrap()),
            vec!["slide_01.jpg", "slide_02.jpg", "slide_03.jpg"]
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unavailable_share_target_falls_back_to_archive() {
        let deck = Deck::from_phrases(&["a"]);
        let share = FakeShare::new(false, Ok(ShareOutcome::Shared));
        let path = temp_archive("unavailable.zip");

        let outcome = export_deck(
            &deck,
            &RenderConfig::default(),
            &FontBook::builtin(),
            Some(&share),
            &path,
        )
        .unwrap();
        assert!(matches!(outcome, ExportOutcome::Archived { count: 1, .. }));
        assert!(share.received.lock().unwrap().is_empty());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn available_share_target_takes_the_files() {
        let deck = Deck::from_phrases(&["a", "b"]);
        let share = FakeShare::new(true, Ok(ShareOutcome::Shared));
        let path = temp_archive("shared.zip");

        let outcome = export_deck(
            &deck,
            &RenderConfig::default(),
            &FontBook::builtin(),
            Some(&share),
            &path,
        )
        .unwrap();
        assert_eq!(outcome, ExportOutcome::Shared(2));
        assert_eq!(*share.received.lock().unwrap(), vec!["slide_01.jpg", "slide_02.jpg"]);
        assert!(!path.exists());
    }

    #[test]
    fn cancellation_is_not_an_error() {
        let deck = Deck::from_phrases(&["a"]);
        let share = FakeShare::new(true, Ok(ShareOutcome::Cancelled));
        let outcome = export_deck(
            &deck,
            &RenderConfig::default(),
            &FontBook::builtin(),
            Some(&share),
            &temp_archive("cancelled.zip"),
        )
        .unwrap();
        assert_eq!(outcome, ExportOutcome::Cancelled);
    }

    #[test]
    fn share_failure_is_an_error() {
        let deck = Deck::from_phrases(&["a"]);
        let share = FakeShare::new(true, Err("device gone".into()));
        let result = export_deck(
            &deck,
            &RenderConfig::default(),
            &FontBook::builtin(),
            Some(&share),
            &temp_archive("failed.zip"),
        );
        assert!(matches!(result, Err(SlideError::Export(_))));
    }

    #[test]
    fn write_files_into_directory() {
        let dir = std::env::temp_dir().join("carosello_write_files_test");
        let _ = std::fs::remove_dir_all(&dir);
        let files = vec![ExportFile::slide(0, vec![7])];
        let paths = write_files(&files, &dir).unwrap();
        assert_eq!(paths, vec![dir.join("slide_01.jpg")]);
        assert_eq!(std::fs::read(&paths[0]).unwrap(), vec![7]);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
