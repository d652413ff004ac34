// src/sbom.rs

//! SBOM component records and `pkg:rpm` package URL composition.

use serde::Serialize;

/// One software-bill-of-materials entry for a fetched artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    pub name: String,
    pub version: String,
    pub purl: String,
}

/// Compose a `pkg:rpm` package URL.
///
/// Shape: `pkg:rpm[/<vendor>]/<name>@[<epoch>:]<version>-<release>`
/// `?arch=<arch>&download_url=<percent-encoded url>`. Vendor and epoch
/// are omitted when absent.
pub fn rpm_purl(
    vendor: Option<&str>,
    name: &str,
    epoch: Option<&str>,
    version: &str,
    release: &str,
    arch: &str,
    download_url: &str,
) -> String {
    let mut purl = String::from("pkg:rpm/");
    if let Some(vendor) = vendor {
        purl.push_str(vendor);
        purl.push('/');
    }
    purl.push_str(name);
    purl.push('@');
    if let Some(epoch) = epoch {
        purl.push_str(epoch);
        purl.push(':');
    }
    purl.push_str(version);
    purl.push('-');
    purl.push_str(release);
    purl.push_str("?arch=");
    purl.push_str(arch);
    purl.push_str("&download_url=");
    purl.push_str(&encode_download_url(download_url));
    purl
}

// Path separators stay literal in the qualifier, everything else is
// percent-encoded
fn encode_download_url(url: &str) -> String {
    urlencoding::encode(url).replace("%2F", "/")
}
