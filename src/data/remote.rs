use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::blocking::Response;
use reqwest::Url;
use thiserror::Error;

use super::loader;
use super::model::EmployeeTable;

/// Shared drive file holding the employee performance CSV.
pub const DEFAULT_DRIVE_FILE_ID: &str = "1PYjw9lKCby0Kuj1d_VGFPYRIHFSBX7FM";

/// Direct-download URL for a shared drive file.
pub fn drive_download_url(file_id: &str) -> String {
    format!("https://drive.google.com/uc?export=download&id={file_id}")
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to download data: HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Failed to download data from {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// An HTML page came back instead of the file, and no confirmation
    /// link in it led to the file.
    #[error("Expected CSV from {url} but received an HTML page")]
    UnexpectedHtml { url: String },
}

// ---------------------------------------------------------------------------
// Data sources
// ---------------------------------------------------------------------------

/// Where the employee table comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Drive { file_id: String },
    Url(String),
    File(PathBuf),
}

impl DataSource {
    pub fn url(&self) -> Option<String> {
        match self {
            DataSource::Drive { file_id } => Some(drive_download_url(file_id)),
            DataSource::Url(url) => Some(url.clone()),
            DataSource::File(_) => None,
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Drive { file_id } => write!(f, "drive file {file_id}"),
            DataSource::Url(url) => write!(f, "{url}"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Options applied while loading a source.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub timeout: Duration,
    /// Keep only rows without missing cells.
    pub drop_missing: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            drop_missing: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Download `url` with a blocking GET. Anything but a 2xx is an error.
///
/// Large drive files are answered with an HTML "can't scan for viruses"
/// page first. Its confirmation link is followed once; any other HTML body
/// is a [`FetchError::UnexpectedHtml`].
pub fn fetch_bytes(url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        // The confirmation page sets a cookie the follow-up request must carry.
        .cookie_store(true)
        .build()
        .map_err(|source| transport(url, source))?;

    let response = get(&client, url)?;
    if !is_html(&response) {
        return read_body(url, response);
    }

    let page_url = response.url().clone();
    let page = response.text().map_err(|source| transport(url, source))?;
    let Some(confirmed) = confirm_url(&page_url, &page) else {
        return Err(FetchError::UnexpectedHtml {
            url: url.to_string(),
        });
    };

    log::info!("Following download confirmation to {confirmed}");
    let response = get(&client, confirmed.as_str())?;
    if is_html(&response) {
        return Err(FetchError::UnexpectedHtml {
            url: confirmed.to_string(),
        });
    }
    read_body(confirmed.as_str(), response)
}

fn transport(url: &str, source: reqwest::Error) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        source,
    }
}

fn get(client: &reqwest::blocking::Client, url: &str) -> Result<Response, FetchError> {
    let response = client.get(url).send().map_err(|source| transport(url, source))?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response)
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"))
}

fn read_body(url: &str, response: Response) -> Result<Vec<u8>, FetchError> {
    let body = response.bytes().map_err(|source| transport(url, source))?;
    Ok(body.to_vec())
}

static DOWNLOAD_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<form\b[^>]*\baction="([^"]*)"[^>]*>(.*?)</form>"#).unwrap()
});
static FORM_INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<input\b[^>]*\bname="([^"]+)"[^>]*\bvalue="([^"]*)""#).unwrap());
static CONFIRM_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"]*[?&;]confirm=[^"]*)""#).unwrap());

/// The URL that confirms a download from the drive's confirmation `page`.
///
/// Current pages carry a `download-form` whose inputs become the query;
/// older ones link to `/uc?...&confirm=<token>` directly.
fn confirm_url(page_url: &Url, page: &str) -> Option<Url> {
    for form in DOWNLOAD_FORM.captures_iter(page) {
        let inputs: Vec<(String, String)> = FORM_INPUT
            .captures_iter(&form[2])
            .map(|input| (unescape(&input[1]), unescape(&input[2])))
            .collect();
        if !inputs.iter().any(|(name, _)| name == "confirm") {
            continue;
        }
        let mut url = page_url.join(&unescape(&form[1])).ok()?;
        url.query_pairs_mut().extend_pairs(&inputs);
        return Some(url);
    }

    let link = CONFIRM_LINK.captures(page)?;
    page_url.join(&unescape(&link[1])).ok()
}

fn unescape(attr: &str) -> String {
    attr.replace("&amp;", "&")
}

/// Fetch or read `source`, parse it and apply `options`.
pub fn load_source(source: &DataSource, options: &LoadOptions) -> Result<EmployeeTable> {
    let table = match source {
        DataSource::File(path) => loader::load_file(path)?,
        remote => {
            // `url()` is Some for every non-file source.
            let url = remote.url().unwrap_or_default();
            log::info!("Downloading employee data from {url}");
            let bytes = fetch_bytes(&url, options.timeout)?;
            loader::load_csv_reader(bytes.as_slice())
                .with_context(|| format!("parsing CSV downloaded from {url}"))?
        }
    };

    if options.drop_missing {
        let clean = table.without_missing();
        let dropped = table.len() - clean.len();
        if dropped > 0 {
            log::warn!("Dropped {dropped} rows with missing values");
        }
        Ok(clean)
    } else {
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc::{self, Receiver};
    use std::thread;

    use super::*;

    type Reply = (&'static str, &'static str, &'static str);

    /// Answer one connection per entry of `replies`, in order, and return
    /// the URL to request. Request lines arrive on the receiver.
    fn serve(replies: Vec<Reply>) -> (String, Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for (status_line, content_type, body) in replies {
                let (mut stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut head = Vec::new();
                let mut line = String::new();
                while reader.read_line(&mut line).unwrap() > 0 {
                    if line == "\r\n" {
                        break;
                    }
                    head.push(line.trim_end().to_string());
                    line.clear();
                }
                let _ = tx.send(head.join("\n"));
                write!(
                    stream,
                    "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                )
                .unwrap();
                stream.flush().unwrap();
            }
        });
        (format!("http://{addr}/employee_performance.csv"), rx)
    }

    fn serve_once(status_line: &'static str, content_type: &'static str, body: &'static str) -> String {
        serve(vec![(status_line, content_type, body)]).0
    }

    const CONFIRM_FORM: &str = r#"<html><body><p>Google Drive can't scan this file for viruses.</p>
<form id="download-form" action="/download" method="get"><input type="submit" id="uc-download-link" value="Download anyway"/><input type="hidden" name="id" value="abc"><input type="hidden" name="export" value="download"><input type="hidden" name="confirm" value="t"><input type="hidden" name="uuid" value="u-1"></form>
</body></html>"#;

    #[test]
    fn drive_url_embeds_file_id() {
        assert_eq!(
            drive_download_url("abc"),
            "https://drive.google.com/uc?export=download&id=abc"
        );
        assert_eq!(
            DataSource::Drive { file_id: "abc".into() }.url().as_deref(),
            Some("https://drive.google.com/uc?export=download&id=abc")
        );
        assert_eq!(DataSource::File("x.csv".into()).url(), None);
    }

    #[test]
    fn non_success_status_is_an_error() {
        let url = serve_once("404 Not Found", "text/plain", "missing");
        let err = fetch_bytes(&url, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(err.to_string().contains("HTTP 404"));
    }

    #[test]
    fn html_without_confirmation_is_an_error() {
        let url = serve_once("200 OK", "text/html; charset=utf-8", "<html></html>");
        let err = fetch_bytes(&url, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, FetchError::UnexpectedHtml { .. }));
    }

    #[test]
    fn confirm_url_from_download_form() {
        let page_url = Url::parse("https://drive.google.com/uc?export=download&id=abc").unwrap();
        let url = confirm_url(&page_url, CONFIRM_FORM).unwrap();
        assert_eq!(
            url.as_str(),
            "https://drive.google.com/download?id=abc&export=download&confirm=t&uuid=u-1"
        );
    }

    #[test]
    fn confirm_url_from_legacy_link() {
        let page_url = Url::parse("https://drive.google.com/uc?export=download&id=abc").unwrap();
        let page = r#"<a id="uc-download-link" href="/uc?export=download&amp;confirm=Xy_9&amp;id=abc">Download anyway</a>"#;
        let url = confirm_url(&page_url, page).unwrap();
        assert_eq!(
            url.as_str(),
            "https://drive.google.com/uc?export=download&confirm=Xy_9&id=abc"
        );
    }

    #[test]
    fn confirm_url_ignores_forms_without_token() {
        let page_url = Url::parse("https://drive.google.com/uc?id=abc").unwrap();
        let page = r#"<form action="/signin"><input type="hidden" name="continue" value="x"></form>"#;
        assert_eq!(confirm_url(&page_url, page), None);
    }

    #[test]
    fn confirmation_page_is_followed_once() {
        let (url, requests) = serve(vec![
            ("200 OK", "text/html; charset=utf-8", CONFIRM_FORM),
            ("200 OK", "text/csv", "employee_id,department\n1,Technology\n"),
        ]);
        let bytes = fetch_bytes(&url, Duration::from_secs(5)).unwrap();
        assert_eq!(bytes, b"employee_id,department\n1,Technology\n");

        assert!(requests.recv().unwrap().starts_with("GET /employee_performance.csv "));
        assert!(requests
            .recv()
            .unwrap()
            .starts_with("GET /download?id=abc&export=download&confirm=t&uuid=u-1 "));
    }

    #[test]
    fn second_confirmation_page_is_an_error() {
        let (url, _requests) = serve(vec![
            ("200 OK", "text/html", CONFIRM_FORM),
            ("200 OK", "text/html", CONFIRM_FORM),
        ]);
        let err = fetch_bytes(&url, Duration::from_secs(5)).unwrap_err();
        match err {
            FetchError::UnexpectedHtml { url } => assert!(url.contains("/download?")),
            other => panic!("expected UnexpectedHtml, got {other:?}"),
        }
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let err = fetch_bytes(&format!("http://127.0.0.1:{port}/"), Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[test]
    fn load_source_downloads_and_drops_missing_rows() {
        let url = serve_once(
            "200 OK",
            "text/csv",
            "employee_id,department,education\n1,Technology,Bachelor's\n2,HR,\n",
        );
        let options = LoadOptions {
            drop_missing: true,
            ..LoadOptions::default()
        };
        let table = load_source(&DataSource::Url(url), &options).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].number("employee_id"), Some(1.0));
    }

    #[test]
    fn load_source_surfaces_status_error() {
        let url = serve_once("500 Internal Server Error", "text/plain", "boom");
        let err = load_source(&DataSource::Url(url), &LoadOptions::default()).unwrap_err();
        let fetch = err.downcast_ref::<FetchError>().unwrap();
        assert!(matches!(fetch, FetchError::Status { status: 500, .. }));
    }
}
