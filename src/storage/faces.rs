use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use crate::types::{IdentityError, Result};

pub const FACES_DIR: &str = "faces";
pub const JPEG_QUALITY: u8 = 80;

const FACE_SUFFIX: &str = "_face.jpg";

/// Directory of JPEG face images, one file per identity key.
#[derive(Clone, Debug)]
pub struct FaceStore {
    dir: PathBuf,
}

impl FaceStore {
    /// Uses `<data_dir>/faces`, creating it if needed.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let dir = data_dir.as_ref().join(FACES_DIR);
        fs::create_dir_all(&dir).map_err(|e| IdentityError::io("create faces dir", &dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: i64) -> PathBuf {
        self.dir.join(format!("{key}{FACE_SUFFIX}"))
    }

    /// Encodes `image` as JPEG and replaces the face stored for `key`.
    ///
    /// `None` leaves any existing face untouched.
    pub fn write(&self, key: i64, image: Option<&DynamicImage>) -> Result<()> {
        let Some(image) = image else {
            return Ok(());
        };

        let target = self.path_for(key);
        let temp = target.with_extension("jpg.tmp");

        let res = encode_jpeg(key, image, &temp).and_then(|()| {
            fs::rename(&temp, &target).map_err(|e| IdentityError::io("rename face", &target, e))
        });
        if let Err(err) = res {
            discard_temp(&temp);
            return Err(err);
        }
        log::debug!("stored face for key {} at {}", key, target.display());
        Ok(())
    }

    /// Decodes the face stored for `key`, or `None` if there is none.
    pub fn read(&self, key: i64) -> Result<Option<DynamicImage>> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IdentityError::io("read face", &path, e)),
        };
        let image = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg)
            .map_err(|source| IdentityError::Decode { path, source })?;
        Ok(Some(image))
    }

    pub fn contains(&self, key: i64) -> bool {
        self.path_for(key).is_file()
    }

    pub fn delete(&self, key: i64) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(IdentityError::io("delete face", &path, e)),
        }
    }

    /// Removes everything inside the faces directory, keeping the directory itself.
    pub fn clear(&self) -> Result<()> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return fs::create_dir_all(&self.dir)
                    .map_err(|e| IdentityError::io("create faces dir", &self.dir, e));
            }
            Err(e) => return Err(IdentityError::io("list faces", &self.dir, e)),
        };

        let mut removed = 0usize;
        for entry in entries {
            let entry = entry.map_err(|e| IdentityError::io("list faces", &self.dir, e))?;
            let path = entry.path();
            let is_dir = entry
                .file_type()
                .map_err(|e| IdentityError::io("stat face", &path, e))?
                .is_dir();
            let res = if is_dir {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match res {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(IdentityError::io("delete face", &path, e)),
            }
        }
        log::debug!("cleared {} entries from {}", removed, self.dir.display());
        Ok(())
    }

    /// Number of entries currently in the faces directory.
    pub fn len(&self) -> Result<usize> {
        let entries =
            fs::read_dir(&self.dir).map_err(|e| IdentityError::io("list faces", &self.dir, e))?;
        let mut n = 0;
        for entry in entries {
            entry.map_err(|e| IdentityError::io("list faces", &self.dir, e))?;
            n += 1;
        }
        Ok(n)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn encode_jpeg(key: i64, image: &DynamicImage, temp: &Path) -> Result<()> {
    let file = fs::File::create(temp).map_err(|e| IdentityError::io("create face", temp, e))?;
    let mut out = BufWriter::new(file);
    image
        .to_rgb8()
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))
        .map_err(|source| IdentityError::Encode { key, source })?;
    out.flush()
        .map_err(|e| IdentityError::io("write face", temp, e))
}

// Best effort: the write error is what the caller sees.
fn discard_temp(temp: &Path) {
    match fs::remove_file(temp) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("could not remove {}: {}", temp.display(), e),
    }
}
