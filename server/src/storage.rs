use futures::FutureExt;

/// Raw demo log bytes, either mapped from disk or held in memory.
pub enum DemoData {
    MemMapped(std::sync::Arc<memmap2::Mmap>),
    Preloaded(std::sync::Arc<[u8]>),
}

impl DemoData {
    pub fn data(&self) -> &[u8] {
        match self {
            Self::MemMapped(mmap) => mmap,
            Self::Preloaded(bytes) => bytes,
        }
    }
}

pub trait DemoStorage: Send + Sync {
    fn duplicate(&self) -> Box<dyn DemoStorage>;

    fn store<'f, 's, 'own>(
        &'own self,
        demo_id: String,
        stream: futures_util::stream::BoxStream<'s, Result<axum::body::Bytes, std::io::Error>>,
    ) -> futures::future::BoxFuture<'f, Result<(), String>>
    where
        's: 'f,
        'own: 'f;

    fn load<'f, 'own>(
        &'own self,
        demo_id: String,
    ) -> futures::future::BoxFuture<'f, Result<DemoData, String>>
    where
        'own: 'f;

    fn remove<'f, 'own>(
        &'own self,
        demo_id: String,
    ) -> futures::future::BoxFuture<'f, Result<(), String>>
    where
        'own: 'f;
}

pub struct FileStorage {
    folder: std::sync::Arc<std::path::PathBuf>,
}

impl FileStorage {
    pub fn new<P>(folder: P) -> Self
    where
        P: Into<std::path::PathBuf>,
    {
        Self {
            folder: std::sync::Arc::new(folder.into()),
        }
    }

    fn demo_path(&self, demo_id: &str) -> std::path::PathBuf {
        self.folder
            .join(format!("{}.{}", demo_id, collector::replay::FILE_EXTENSION))
    }
}

impl DemoStorage for FileStorage {
    fn duplicate(&self) -> Box<dyn DemoStorage> {
        Box::new(Self {
            folder: self.folder.clone(),
        })
    }

    fn store<'f, 's, 'own>(
        &'own self,
        demo_id: String,
        stream: futures_util::stream::BoxStream<'s, Result<axum::body::Bytes, std::io::Error>>,
    ) -> futures::future::BoxFuture<'f, Result<(), String>>
    where
        's: 'f,
        'own: 'f,
    {
        let path = self.demo_path(&demo_id);

        async move {
            if let Some(parent) = path.parent() {
                if !tokio::fs::try_exists(parent).await.unwrap_or(false) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|err| err.to_string())?;
                }
            }

            async {
                // The stream already yields io::Results, so it plugs straight
                // into an `AsyncRead`.
                let body_reader = tokio_util::io::StreamReader::new(stream);
                futures::pin_mut!(body_reader);

                let mut file = tokio::io::BufWriter::new(tokio::fs::File::create(&path).await?);

                tokio::io::copy(&mut body_reader, &mut file).await?;
                tokio::io::AsyncWriteExt::shutdown(&mut file).await?;

                Ok::<_, std::io::Error>(())
            }
            .await
            .map_err(|err| err.to_string())
        }
        .boxed()
    }

    fn load<'f, 'own>(
        &'own self,
        demo_id: String,
    ) -> futures::future::BoxFuture<'f, Result<DemoData, String>>
    where
        'own: 'f,
    {
        async move {
            let path = self.demo_path(&demo_id);
            let file = std::fs::File::open(path.as_path())
                .map_err(|err| format!("Opening {}: {}", path.display(), err))?;
            let mmap = unsafe {
                memmap2::MmapOptions::new()
                    .map(&file)
                    .map_err(|err| format!("Mapping {}: {}", path.display(), err))?
            };

            Ok(DemoData::MemMapped(std::sync::Arc::new(mmap)))
        }
        .boxed()
    }

    fn remove<'f, 'own>(
        &'own self,
        demo_id: String,
    ) -> futures::future::BoxFuture<'f, Result<(), String>>
    where
        'own: 'f,
    {
        async move {
            let path = self.demo_path(&demo_id);
            tokio::fs::remove_file(&path)
                .await
                .map_err(|err| format!("Removing {}: {}", path.display(), err))
        }
        .boxed()
    }
}
