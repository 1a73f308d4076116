use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use proc_macro2::Span;
use toml_edit::{Document, Item, Table};

/// The `Cargo.toml` of the crate invoking a proc-macro, used to find the
/// [`syn::Path`] under which a workspace crate is reachable from it.
///
/// # Example
///
/// ```rust
/// # use vc_macro_utils::Manifest;
/// let p: syn::Path = Manifest::shared(|m| m.get_crate_path("vc_json"));
/// ```
///
/// Reading the manifest is not cheap, call [`Manifest::shared`] once per
/// macro invocation and pass the path around.
///
/// # Resolution rules
///
/// 1. The crate is a dependency under its own name: `::vc_json`.
/// 2. The crate is a dependency renamed through `package = "vc_json"`:
///    `::renamed`.
/// 3. The crate name starts with `vc_` and the umbrella `vc_serde` is a
///    dependency: `::vc_serde::json`.
/// 4. Steps 1 to 3 again in `dev-dependencies`.
/// 5. Otherwise `::vc_json`.
///
/// A manifest that can't be located or parsed resolves everything by step 5.
///
/// ## Note
///
/// Library code of a crate refers to itself through `crate::`, while its
/// doctests use `::crate_name`. The generated paths are only valid in both
/// when the crate root has `extern crate self as vc_json;`.
#[derive(Debug)]
pub struct Manifest {
    pub manifest: Option<Document<Box<str>>>,
    pub modified_time: Option<SystemTime>,
}

const UMBRELLA_NAME: &str = "vc_serde";
const CRATE_PREFIX: &str = "vc_";

impl Manifest {
    #[inline(never)]
    fn get_manifest_path() -> Option<PathBuf> {
        let mut path = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR")?);
        path.push("Cargo.toml");
        path.exists().then_some(path)
    }

    #[inline(never)]
    fn get_manifest_modified_time(path: &Path) -> Option<SystemTime> {
        std::fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .ok()
    }

    #[inline(never)]
    fn read_manifest(path: &Path) -> Option<Document<Box<str>>> {
        let manifest = std::fs::read_to_string(path).ok()?.into_boxed_str();
        Document::parse(manifest).ok()
    }

    #[inline]
    fn absolute(segments: &[&str]) -> Option<syn::Path> {
        syn::parse_str(&format!("::{}", segments.join("::"))).ok()
    }

    fn find_in_deps(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Self::absolute(&[name]);
        }

        // `alias = { package = "name", ... }`
        let renamed = deps.iter().find(|(_, item)| {
            item.get("package").and_then(Item::as_str) == Some(name)
        });
        if let Some((alias, _)) = renamed {
            return Self::absolute(&[alias]);
        }

        let module = name.strip_prefix(CRATE_PREFIX)?;
        if deps.contains_key(UMBRELLA_NAME) {
            return Self::absolute(&[UMBRELLA_NAME, module]);
        }
        None
    }

    /// Returns the path of the crate named `name` as seen from the invoking
    /// crate. See the type documentation for the resolution order.
    #[inline(never)]
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        let resolved = self.manifest.as_ref().and_then(|manifest| {
            ["dependencies", "dev-dependencies"].into_iter().find_map(|key| {
                match manifest.get(key) {
                    Some(Item::Table(deps)) => Self::find_in_deps(deps, name),
                    _ => None,
                }
            })
        });

        resolved.unwrap_or_else(|| {
            let mut path = syn::Path::from(syn::Ident::new(name, Span::call_site()));
            path.leading_colon = Some(Default::default());
            path
        })
    }

    /// Obtain the [`Manifest`] of the caller's `Cargo.toml`.
    ///
    /// Parsed manifests are cached per path and reparsed when the file's
    /// modification time changes.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let Some(manifest_path) = Self::get_manifest_path() else {
            return func(&Manifest {
                manifest: None,
                modified_time: None,
            });
        };
        let modified_time = Self::get_manifest_modified_time(&manifest_path);

        let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(manifest) = manifests.get(&manifest_path)
            && manifest.modified_time.is_some()
            && manifest.modified_time == modified_time
        {
            return func(manifest);
        }
        drop(manifests);

        let manifest = Manifest {
            manifest: Self::read_manifest(&manifest_path),
            modified_time,
        };
        let result = func(&manifest);

        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(manifest_path, manifest);

        result
    }
}

// -----------------------------------------------------------------------------
// Tests
