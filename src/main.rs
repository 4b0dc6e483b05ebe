use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use application::query::cover_cache::KeyValueCache;
use application::query::dao::{AlbumLookup, FilePathDao};
use application::query::get_cover_art::{EmbeddedArtExtractor, GetCoverArt};
use domain::value::{AlbumId, MediaPath};
use infra::config::AppConfigImpl;
use infra::repository::in_memory::{InMemoryAlbumDao, InMemoryFilePathDao, LibraryIndex};
use infra::repository::postgres::query::{AlbumCoverDaoImpl, FilePathDaoImpl};
use infra::{EmbeddedArtExtractorImpl, LocalFileResolver, SledKeyValueCache};
use log4rs::{
    append::{console::ConsoleAppender, file::FileAppender},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};

const USAGE: &str = "usage: cover-cache <get|evict> <user_id> <album_id>... | cover-cache clear <user_id>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfigImpl::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    init_logging(cfg.log_file())?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, user_id) = match args.as_slice() {
        [command, user_id, ..] => (command.as_str(), user_id.as_str()),
        _ => bail!(USAGE),
    };

    if command == "clear" {
        return clear_user_cache(&cfg, user_id);
    }

    let album_ids = args[2..]
        .iter()
        .map(|s| s.parse::<i64>().map(AlbumId::from))
        .collect::<Result<Vec<_>, _>>()
        .context("album_id must be an integer")?;
    if album_ids.is_empty() {
        bail!(USAGE);
    }

    let service = build_cover_service(&cfg).await?;
    let root = MediaPath::local(cfg.music_root());

    match command {
        "get" => {
            for album_id in &album_ids {
                match service.get_cover(album_id, user_id, &root).await {
                    Some(cover) => {
                        let out = PathBuf::from(format!(
                            "cover_{}.{}",
                            album_id,
                            extension_of(cover.mime_type())
                        ));
                        tokio::fs::write(&out, cover.content())
                            .await
                            .with_context(|| format!("Failed to write {}", out.display()))?;
                        log::info!("Saved cover of album {} to {}", album_id, out.display());
                    }
                    None => log::warn!("No cover available for album {}", album_id),
                }
            }
        }
        "evict" => {
            for album_id in &album_ids {
                service.remove_cover_from_cache(album_id, user_id).await;
                log::info!("Evicted cached cover of album {}", album_id);
            }
        }
        _ => bail!(USAGE),
    }

    Ok(())
}

/// 配置日志同时输出到控制台和文件
fn init_logging(log_file: &str) -> anyhow::Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {m}{n}",
        )))
        .build(log_file)?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .appender(Appender::builder().build("stdout", Box::new(ConsoleAppender::builder().build())))
        .build(
            Root::builder()
                .appender("file")
                .appender("stdout")
                .build(log_level.parse().unwrap_or(log::LevelFilter::Info)),
        )?;

    log4rs::init_config(config)?;
    Ok(())
}

/// 删除某个用户的全部缓存条目
fn clear_user_cache(cfg: &AppConfigImpl, user_id: &str) -> anyhow::Result<()> {
    let cache = SledKeyValueCache::new(cfg.cache().cover_cache_path())
        .context("Failed to open cover cache")?;
    let removed = cache.clear_scope(user_id)?;
    cache.flush()?;
    log::info!("Removed {} cache entries of user {}", removed, user_id);
    Ok(())
}

async fn init_db(db_url: &str) -> anyhow::Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(db_url.to_string());
    opt.max_connections(16)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(3))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .context("Failed to connect to database")?;
    db.execute(Statement::from_string(DbBackend::Postgres, "SELECT 1".to_owned()))
        .await
        .context("Failed to execute test query")?;

    log::info!("Database connection pool initialized successfully");
    Ok(db)
}

/// 根据配置组装封面服务
async fn build_cover_service(cfg: &AppConfigImpl) -> anyhow::Result<GetCoverArt> {
    let (album_lookup, file_paths): (Arc<dyn AlbumLookup>, Arc<dyn FilePathDao>) =
        match cfg.database_url() {
            Some(url) => {
                let db = init_db(url).await?;
                let albums: Arc<dyn AlbumLookup> = Arc::new(AlbumCoverDaoImpl::new(db.clone()));
                let files: Arc<dyn FilePathDao> = Arc::new(FilePathDaoImpl::new(db));
                (albums, files)
            }
            None => {
                let Some(index_file) = cfg.index_file() else {
                    bail!("Either database_url or index_file must be configured");
                };
                let index = LibraryIndex::load(&index_file).with_context(|| {
                    format!("Failed to load index file {}", index_file.display())
                })?;

                let albums = InMemoryAlbumDao::new();
                let files = InMemoryFilePathDao::new();
                let (album_count, file_count) = index.seed(&albums, &files);
                log::info!(
                    "Loaded {} albums and {} files from {}",
                    album_count,
                    file_count,
                    index_file.display()
                );

                let albums: Arc<dyn AlbumLookup> = Arc::new(albums);
                let files: Arc<dyn FilePathDao> = Arc::new(files);
                (albums, files)
            }
        };

    let cache_path = cfg.cache().cover_cache_path();
    log::info!("Using sled cover cache at {}", cache_path.display());
    let cache: Arc<dyn KeyValueCache> =
        Arc::new(SledKeyValueCache::new(cache_path).context("Failed to open cover cache")?);

    let extractor_cfg = cfg.extractor();
    let extractor: Arc<dyn EmbeddedArtExtractor> = if extractor_cfg.ffmpeg_enabled {
        Arc::new(EmbeddedArtExtractorImpl::with_ffmpeg(extractor_cfg.ffmpeg_path))
    } else {
        Arc::new(EmbeddedArtExtractorImpl::new())
    };

    Ok(GetCoverArt::new(
        album_lookup,
        Arc::new(LocalFileResolver::new(file_paths)),
        extractor,
        cache,
    ))
}

fn extension_of(mime_type: &str) -> &str {
    match mime_type.split('/').nth(1) {
        Some("jpeg") => "jpg",
        Some("svg+xml") => "svg",
        Some(subtype) if !subtype.is_empty() => subtype,
        _ => "bin",
    }
}
