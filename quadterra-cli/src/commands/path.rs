//! `path`: show where a key is stored under each addressing scheme.

use std::path::{Path, PathBuf};

use clap::Args;
use quadterra::key::TileKey;
use quadterra::store::{AddressScheme, SourceId};

use super::common::{load_config, parse_key, GlobalArgs};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct PathArgs {
    /// Canonical key, e.g. g0312
    pub key: String,

    /// Source (layer) name used as the cache subdirectory
    #[arg(long)]
    pub source: String,

    /// Address the source's heightfield instead of its imagery
    #[arg(long)]
    pub elevation: bool,

    /// Source file extension (overridden by the cache format, if any)
    #[arg(long)]
    pub extension: Option<String>,
}

const SCHEMES: [(&str, AddressScheme); 4] = [
    ("tilecache", AddressScheme::Bucketed),
    ("tms", AddressScheme::Tms { invert_y: false }),
    ("tms (google)", AddressScheme::Tms { invert_y: true }),
    ("quadkey", AddressScheme::QuadKey),
];

pub fn run(args: PathArgs, global: &GlobalArgs) -> Result<(), CliError> {
    let config = load_config(global)?;
    let key = parse_key(&args.key, &config)?;

    let mut source = if args.elevation {
        SourceId::heightfield(&args.source)
    } else {
        SourceId::image(&args.source)
    };
    if let Some(extension) = args.extension {
        source = source.with_extension(extension);
    }

    let root = config
        .cache
        .path
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let configured = config.cache.kind.scheme();

    println!("Store root: {}", root.display());
    for (label, address) in addresses(&root, &source, &key, config.cache.format.as_deref()) {
        let marker = if configured == Some(address.0) { "*" } else { " " };
        match address.1 {
            Ok(path) => println!("{} {:<13} {}", marker, label, path.display()),
            Err(e) => println!("{} {:<13} unaddressable: {}", marker, label, e),
        }
    }
    Ok(())
}

type Address = (AddressScheme, Result<PathBuf, quadterra::key::KeyError>);

/// Path of `key` for `source` under every scheme.
pub fn addresses(
    root: &Path,
    source: &SourceId,
    key: &TileKey,
    format: Option<&str>,
) -> Vec<(&'static str, Address)> {
    let extension = source.resolve_extension(format);
    SCHEMES
        .iter()
        .map(|(label, scheme)| {
            let path = scheme.path(root, &source.name, key, extension);
            (*label, (*scheme, path))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadterra::key::Profile;

    fn path_for(label: &str, list: &[(&'static str, Address)]) -> PathBuf {
        let (_, (_, path)) = list.iter().find(|(l, _)| *l == label).unwrap();
        path.as_ref().unwrap().clone()
    }

    #[test]
    fn test_every_scheme_is_listed() {
        let key = TileKey::new(Profile::Mercator, 2, 1, 0).unwrap();
        let list = addresses(Path::new("/cache"), &SourceId::image("osm"), &key, None);

        assert_eq!(list.len(), 4);
        assert_eq!(path_for("tms", &list), PathBuf::from("/cache/osm/2/1/3.png"));
        assert_eq!(path_for("tms (google)", &list), PathBuf::from("/cache/osm/2/1/0.png"));
        assert_eq!(
            path_for("quadkey", &list),
            PathBuf::from(format!("/cache/osm/{}.png", key))
        );
    }

    #[test]
    fn test_format_and_kind_pick_extension() {
        let key = Profile::Geodetic.root_keys()[0];
        let image = SourceId::image("ortho").with_extension("jpg");
        let list = addresses(Path::new("/c"), &image, &key, Some("png"));
        assert_eq!(path_for("quadkey", &list), PathBuf::from("/c/ortho/g0.png"));

        let dem = SourceId::heightfield("dem");
        let list = addresses(Path::new("/c"), &dem, &key, Some("png"));
        assert_eq!(path_for("quadkey", &list), PathBuf::from("/c/dem/g0.qthf"));
    }

    #[test]
    fn test_off_globe_rows_are_unaddressable_except_by_quadkey() {
        let key = Profile::PlateCarre.root_keys()[0].subkey(2).unwrap();
        let list = addresses(Path::new("/c"), &SourceId::image("x"), &key, None);

        let failures: Vec<&str> = list
            .iter()
            .filter(|(_, (_, path))| path.is_err())
            .map(|(label, _)| *label)
            .collect();
        assert_eq!(failures, vec!["tilecache", "tms", "tms (google)"]);
    }
}
