//! Crowdin project API client.

use bytes::Bytes;
use serde_json::Value;
use std::path::Path;
use tracing::debug;
use url::Url;

use crate::api::error::RemoteError;
use crate::api::form::Form;
use crate::config::{ClientConfig, ClientOptions};
use crate::error::{CrowdinError, Result};
use crate::http::{EndpointRequest, HttpMethod, HttpTransport, RawResponse, ReqwestTransport};
use crate::info::{find_branch, find_file};

/// Translation package downloaded when none is named.
pub const DEFAULT_PACKAGE: &str = "all";

/// Query parameter asking Crowdin for JSON instead of XML.
const JSON_PARAM: (&str, &str) = ("json", "1");

/// Crowdin project API client.
///
/// Holds only immutable configuration, so a single client can serve any
/// number of concurrent calls.
#[derive(Debug, Clone)]
pub struct CrowdinClient<T = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
}

impl CrowdinClient<ReqwestTransport> {
    /// Create a client using the default reqwest transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }

    /// Create a client from a loose options object.
    pub fn from_options(options: ClientOptions) -> Result<Self> {
        Ok(Self::new(ClientConfig::from_options(options)?))
    }
}

impl<T: HttpTransport> CrowdinClient<T> {
    /// Create a client on top of a custom transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Connection settings in use.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the authenticated URL for an endpoint.
    ///
    /// The URL always carries `json=1` and the authentication parameters;
    /// caller parameters are appended after them and cannot override them.
    pub fn build_endpoint_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.config.api_base().clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                CrowdinError::Configuration(format!(
                    "API base URL `{}` cannot carry a path",
                    self.config.api_base()
                ))
            })?;
            segments
                .pop_if_empty()
                .push(self.config.project())
                .extend(path.split('/'));
        }

        let auth = self.config.credentials().query_pairs();
        let is_reserved =
            |key: &str| key == JSON_PARAM.0 || auth.iter().any(|(reserved, _)| *reserved == key);

        {
            let mut query = url.query_pairs_mut();
            query.clear();
            query.append_pair(JSON_PARAM.0, JSON_PARAM.1);
            for &(key, value) in &auth {
                query.append_pair(key, value);
            }
            for &(key, value) in params {
                if is_reserved(key) {
                    debug!(param = %key, "ignoring caller parameter that shadows a reserved one");
                    continue;
                }
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Send a request and decode the successful body as JSON.
    pub async fn send_json(
        &self,
        method: HttpMethod,
        path: &str,
        params: &[(&str, &str)],
        form: Option<&Form>,
    ) -> Result<Value> {
        let body = self.send(method, path, params, form).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Send a request and return the successful body undecoded.
    pub async fn send_stream(
        &self,
        method: HttpMethod,
        path: &str,
        params: &[(&str, &str)],
        form: Option<&Form>,
    ) -> Result<Bytes> {
        self.send(method, path, params, form).await
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        params: &[(&str, &str)],
        form: Option<&Form>,
    ) -> Result<Bytes> {
        let url = self.build_endpoint_url(path, params)?;
        let form = match form {
            Some(form) => Some(form.open().await?),
            None => None,
        };

        debug!(%method, endpoint = path, "crowdin request");
        let response = self
            .transport
            .send(EndpointRequest { method, url, form })
            .await?;
        debug!(%method, endpoint = path, status = response.status, "crowdin response");

        classify(response)
    }

    /// Add new source files (`files[...]`, `export_patterns[...]`, ...).
    pub async fn add_file(&self, form: &Form) -> Result<Value> {
        self.send_json(HttpMethod::Post, "add-file", &[], Some(form)).await
    }

    /// Create a version branch.
    pub async fn create_branch(&self, name: &str) -> Result<Value> {
        self.send_json(
            HttpMethod::Post,
            "add-directory",
            &[("name", name), ("is_branch", "1")],
            None,
        )
        .await
    }

    /// Replace the contents of existing source files.
    pub async fn update_file(&self, form: &Form) -> Result<Value> {
        self.send_json(HttpMethod::Post, "update-file", &[], Some(form)).await
    }

    /// Delete a source file.
    pub async fn delete_file(&self, form: &Form) -> Result<Value> {
        self.send_json(HttpMethod::Post, "delete-file", &[], Some(form)).await
    }

    /// Upload existing translations for source files.
    pub async fn upload_file(&self, form: &Form) -> Result<Value> {
        self.send_json(HttpMethod::Post, "upload-translation", &[], Some(form))
            .await
    }

    /// Translation and proofreading progress per language.
    pub async fn translation_status(&self, form: &Form) -> Result<Value> {
        self.send_json(HttpMethod::Post, "status", &[], Some(form)).await
    }

    /// Detailed progress for a single language.
    pub async fn language_status(&self, form: &Form) -> Result<Value> {
        self.send_json(HttpMethod::Post, "language-status", &[], Some(form))
            .await
    }

    /// Project details and the file/branch tree.
    pub async fn info(&self) -> Result<Value> {
        self.send_json(HttpMethod::Post, "info", &[], None).await
    }

    /// Download a single translated file.
    pub async fn export_file(&self, params: &[(&str, &str)]) -> Result<Bytes> {
        self.send_stream(HttpMethod::Get, "export-file", params, None)
            .await
    }

    /// Ask Crowdin to rebuild the translation packages.
    pub async fn export_translations(&self, params: &[(&str, &str)]) -> Result<Bytes> {
        self.send_stream(HttpMethod::Get, "export", params, None).await
    }

    /// Pre-translate via translation memory or machine translation.
    pub async fn pre_translate(&self, form: &Form) -> Result<Bytes> {
        self.send_stream(HttpMethod::Post, "pre-translate", &[], Some(form))
            .await
    }

    /// Download a translation package as a zip archive.
    ///
    /// With a branch, the branch export is rebuilt first and the download is
    /// only issued once that succeeded.
    pub async fn download_translations(
        &self,
        package: Option<&str>,
        branch: Option<&str>,
    ) -> Result<Bytes> {
        let path = format!("download/{}.zip", package.unwrap_or(DEFAULT_PACKAGE));

        match branch {
            None => self.send_stream(HttpMethod::Get, &path, &[], None).await,
            Some(branch) => {
                self.export_translations(&[("branch", branch)]).await?;
                self.send_stream(HttpMethod::Get, &path, &[("branch", branch)], None)
                    .await
            }
        }
    }

    /// Download a translation package and write it to `dest`.
    ///
    /// Returns the number of bytes written.
    pub async fn download_translations_to_file(
        &self,
        dest: impl AsRef<Path>,
        package: Option<&str>,
        branch: Option<&str>,
    ) -> Result<u64> {
        let archive = self.download_translations(package, branch).await?;
        tokio::fs::write(dest.as_ref(), &archive).await?;
        Ok(archive.len() as u64)
    }

    /// Upload `file_name` into `branch_name`, creating the branch or file as needed.
    ///
    /// Reads the project tree first; an existing file is updated, otherwise it
    /// is added (after creating the branch when that is missing too). The first
    /// failing step aborts the whole operation.
    pub async fn create_or_update_versioned_file(
        &self,
        branch_name: &str,
        file_name: &str,
        path: impl AsRef<Path>,
        export_pattern: &str,
    ) -> Result<Value> {
        let info = self.info().await?;
        let form = Form::versioned_file(file_name, path, export_pattern, branch_name);

        match find_branch(&info, branch_name) {
            Some(branch) => {
                if find_file(branch, file_name).is_some() {
                    debug!(branch = branch_name, file = file_name, "updating existing file");
                    self.update_file(&form).await
                } else {
                    debug!(branch = branch_name, file = file_name, "adding file to branch");
                    self.add_file(&form).await
                }
            }
            None => {
                debug!(branch = branch_name, file = file_name, "creating branch");
                self.create_branch(branch_name).await?;
                self.add_file(&form).await
            }
        }
    }
}

/// Sort a response into a success body or the matching error.
fn classify(response: RawResponse) -> Result<Bytes> {
    if response.status == 200 {
        return Ok(response.body);
    }

    match serde_json::from_slice::<Value>(&response.body) {
        Ok(body) => Err(CrowdinError::Remote(RemoteError::new(response.status, body))),
        Err(_) => Err(CrowdinError::Status(response.status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::http::FormPart;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A request as seen by the scripted transport.
    #[derive(Debug, Clone)]
    struct Recorded {
        method: HttpMethod,
        path: String,
        query: Vec<(String, String)>,
        fields: Vec<String>,
    }

    impl Recorded {
        fn endpoint(&self) -> &str {
            self.path
                .strip_prefix("/api/project/demo/")
                .unwrap_or(&self.path)
        }

        fn param(&self, key: &str) -> Option<&str> {
            self.query
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        }
    }

    /// Replays queued responses and records every request.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<RawResponse>>>,
        requests: Mutex<Vec<Recorded>>,
    }

    impl ScriptedTransport {
        fn respond(self, status: u16, body: &str) -> Self {
            self.responses.lock().unwrap().push_back(Ok(RawResponse {
                status,
                body: Bytes::copy_from_slice(body.as_bytes()),
            }));
            self
        }

        fn fail(self, message: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(CrowdinError::transport(message)));
            self
        }

        fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }

        fn endpoints(&self) -> Vec<String> {
            self.requests()
                .iter()
                .map(|r| r.endpoint().to_string())
                .collect()
        }
    }

    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: EndpointRequest) -> Result<RawResponse> {
            self.requests.lock().unwrap().push(Recorded {
                method: request.method,
                path: request.url.path().to_string(),
                query: request.url.query_pairs().into_owned().collect(),
                fields: request
                    .form
                    .iter()
                    .flatten()
                    .map(|part| part.name().to_string())
                    .collect(),
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(CrowdinError::transport("no scripted response")))
        }
    }

    fn api_key_client(transport: ScriptedTransport) -> CrowdinClient<ScriptedTransport> {
        let config = ClientConfig::new("demo", Credentials::api_key("secret")).unwrap();
        CrowdinClient::with_transport(config, transport)
    }

    fn source_file() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strings.json");
        std::fs::write(&path, br#"{"hello":"Hello"}"#).unwrap();
        (dir, path)
    }

    #[test]
    fn test_endpoint_url_api_key() {
        let client = api_key_client(ScriptedTransport::default());
        let url = client.build_endpoint_url("info", &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.crowdin.com/api/project/demo/info?json=1&key=secret"
        );
    }

    #[test]
    fn test_endpoint_url_login() {
        let config = ClientConfig::new("demo", Credentials::login("alice", "acct")).unwrap();
        let client = CrowdinClient::with_transport(config, ScriptedTransport::default());
        let url = client
            .build_endpoint_url("download/all.zip", &[("branch", "v2")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.crowdin.com/api/project/demo/download/all.zip?json=1&account-key=acct&login=alice&branch=v2"
        );
    }

    #[test]
    fn test_reserved_params_win() {
        let client = api_key_client(ScriptedTransport::default());
        let url = client
            .build_endpoint_url("export", &[("json", "0"), ("key", "stolen"), ("branch", "v2")])
            .unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("json".to_string(), "1".to_string()),
                ("key".to_string(), "secret".to_string()),
                ("branch".to_string(), "v2".to_string()),
            ]
        );
    }

    #[test]
    fn test_reserved_login_params_win() {
        let config = ClientConfig::new("demo", Credentials::login("alice", "acct")).unwrap();
        let client = CrowdinClient::with_transport(config, ScriptedTransport::default());
        let url = client
            .build_endpoint_url(
                "status",
                &[("login", "mallory"), ("account-key", "forged"), ("key", "k")],
            )
            .unwrap();
        assert_eq!(
            url.query(),
            Some("json=1&account-key=acct&login=alice&key=k")
        );
    }

    #[test]
    fn test_endpoint_url_custom_base() {
        let config = ClientConfig::new("demo", Credentials::api_key("secret"))
            .unwrap()
            .with_api_base("http://127.0.0.1:9000/api/project/")
            .unwrap();
        let client = CrowdinClient::with_transport(config, ScriptedTransport::default());
        let url = client.build_endpoint_url("info", &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9000/api/project/demo/info?json=1&key=secret"
        );
    }

    #[tokio::test]
    async fn test_send_json_success() {
        let client = api_key_client(ScriptedTransport::default().respond(200, r#"{"a":1}"#));
        let value = client
            .send_json(HttpMethod::Post, "info", &[], None)
            .await
            .unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_remote_error() {
        let client =
            api_key_client(ScriptedTransport::default().respond(401, r#"{"error":{"code":17}}"#));
        match client.info().await {
            Err(CrowdinError::Remote(err)) => {
                assert_eq!(err.body(), &json!({"error": {"code": 17}}));
                assert_eq!(err.code(), Some(17));
                assert_eq!(err.status(), 401);
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_status_error_for_unparseable_body() {
        let client = api_key_client(
            ScriptedTransport::default()
                .respond(500, "")
                .respond(502, "<html>Bad Gateway</html>"),
        );
        assert!(matches!(client.info().await, Err(CrowdinError::Status(500))));
        assert!(matches!(
            client.export_translations(&[]).await,
            Err(CrowdinError::Status(502))
        ));
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let client = api_key_client(ScriptedTransport::default().fail("connection reset"));
        match client.info().await {
            Err(CrowdinError::Transport { message, .. }) => {
                assert_eq!(message, "connection reset")
            }
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_on_success() {
        let client = api_key_client(ScriptedTransport::default().respond(200, "not json"));
        assert!(matches!(client.info().await, Err(CrowdinError::Json(_))));
    }

    #[tokio::test]
    async fn test_send_stream_keeps_bytes() {
        let payload = [0x50, 0x4b, 0x03, 0x04, 0xff, 0xfe, 0x00];
        let transport = ScriptedTransport::default();
        transport.responses.lock().unwrap().push_back(Ok(RawResponse {
            status: 200,
            body: Bytes::copy_from_slice(&payload),
        }));
        let client = api_key_client(transport);
        let bytes = client.download_translations(None, None).await.unwrap();
        assert_eq!(&bytes[..], &payload);
    }

    #[tokio::test]
    async fn test_endpoint_mapping() {
        let transport = (0..11).fold(ScriptedTransport::default(), |t, _| t.respond(200, "{}"));
        let client = api_key_client(transport);
        let form = Form::new().text("language", "fr");

        client.add_file(&form).await.unwrap();
        client.create_branch("v2").await.unwrap();
        client.update_file(&form).await.unwrap();
        client.delete_file(&form).await.unwrap();
        client.upload_file(&form).await.unwrap();
        client.translation_status(&form).await.unwrap();
        client.language_status(&form).await.unwrap();
        client.info().await.unwrap();
        client.export_file(&[("file", "strings.json")]).await.unwrap();
        client.export_translations(&[]).await.unwrap();
        client.pre_translate(&form).await.unwrap();

        let requests = client.transport.requests();
        let mapping: Vec<(HttpMethod, &str)> =
            requests.iter().map(|r| (r.method, r.endpoint())).collect();
        assert_eq!(
            mapping,
            vec![
                (HttpMethod::Post, "add-file"),
                (HttpMethod::Post, "add-directory"),
                (HttpMethod::Post, "update-file"),
                (HttpMethod::Post, "delete-file"),
                (HttpMethod::Post, "upload-translation"),
                (HttpMethod::Post, "status"),
                (HttpMethod::Post, "language-status"),
                (HttpMethod::Post, "info"),
                (HttpMethod::Get, "export-file"),
                (HttpMethod::Get, "export"),
                (HttpMethod::Post, "pre-translate"),
            ]
        );

        assert_eq!(requests[0].fields, vec!["language"]);
        assert_eq!(requests[1].param("name"), Some("v2"));
        assert_eq!(requests[1].param("is_branch"), Some("1"));
        assert!(requests[1].fields.is_empty());
        assert_eq!(requests[8].param("file"), Some("strings.json"));
        assert!(requests.iter().all(|r| r.param("json") == Some("1")));
        assert!(requests.iter().all(|r| r.param("key") == Some("secret")));
    }

    #[tokio::test]
    async fn test_download_with_branch_exports_first() {
        let client = api_key_client(
            ScriptedTransport::default()
                .respond(200, r#"{"success":{"status":"built"}}"#)
                .respond(200, "PK"),
        );
        let bytes = client
            .download_translations(Some("all"), Some("v2"))
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"PK");

        let requests = client.transport.requests();
        assert_eq!(client.transport.endpoints(), vec!["export", "download/all.zip"]);
        assert_eq!(requests[0].param("branch"), Some("v2"));
        assert_eq!(requests[1].param("branch"), Some("v2"));
    }

    #[tokio::test]
    async fn test_download_stops_when_export_fails() {
        let client = api_key_client(
            ScriptedTransport::default()
                .respond(404, r#"{"error":{"code":8,"message":"Branch not found"}}"#)
                .respond(200, "PK"),
        );
        let err = client
            .download_translations(None, Some("v2"))
            .await
            .unwrap_err();
        assert!(matches!(err, CrowdinError::Remote(ref e) if e.code() == Some(8)));
        assert_eq!(client.transport.endpoints(), vec!["export"]);
    }

    #[tokio::test]
    async fn test_download_package_name() {
        let client = api_key_client(ScriptedTransport::default().respond(200, "PK"));
        client.download_translations(Some("fr"), None).await.unwrap();
        assert_eq!(client.transport.endpoints(), vec!["download/fr.zip"]);
    }

    #[tokio::test]
    async fn test_versioned_file_creates_missing_branch() {
        let (_dir, path) = source_file();
        let client = api_key_client(
            ScriptedTransport::default()
                .respond(200, r#"{"files":[{"node_type":"branch","name":"v1","files":[]}]}"#)
                .respond(200, r#"{"success":true}"#)
                .respond(200, r#"{"success":true}"#),
        );

        client
            .create_or_update_versioned_file("v2", "strings.json", &path, "/%two_letters_code%/%original_file_name%")
            .await
            .unwrap();

        let requests = client.transport.requests();
        assert_eq!(
            client.transport.endpoints(),
            vec!["info", "add-directory", "add-file"]
        );
        assert_eq!(requests[1].param("name"), Some("v2"));
        assert_eq!(
            requests[2].fields,
            vec!["files[strings.json]", "export_patterns[strings.json]", "branch"]
        );
    }

    #[tokio::test]
    async fn test_versioned_file_updates_existing_file() {
        let (_dir, path) = source_file();
        let tree = r#"{"files":[{"node_type":"branch","name":"v2","files":[{"node_type":"file","name":"strings.json"}]}]}"#;
        let client = api_key_client(
            ScriptedTransport::default()
                .respond(200, tree)
                .respond(200, r#"{"success":true}"#),
        );

        let result = client
            .create_or_update_versioned_file("v2", "strings.json", &path, "/%locale%/%file_name%")
            .await
            .unwrap();

        assert_eq!(result, json!({"success": true}));
        assert_eq!(client.transport.endpoints(), vec!["info", "update-file"]);
    }

    #[tokio::test]
    async fn test_versioned_file_adds_to_existing_branch() {
        let (_dir, path) = source_file();
        let tree = r#"{"files":[{"node_type":"branch","name":"v2","files":[{"node_type":"file","name":"other.json"}]}]}"#;
        let client = api_key_client(
            ScriptedTransport::default()
                .respond(200, tree)
                .respond(200, r#"{"success":true}"#),
        );

        client
            .create_or_update_versioned_file("v2", "strings.json", &path, "/%locale%/%file_name%")
            .await
            .unwrap();

        assert_eq!(client.transport.endpoints(), vec!["info", "add-file"]);
    }

    #[tokio::test]
    async fn test_versioned_file_aborts_on_branch_failure() {
        let (_dir, path) = source_file();
        let client = api_key_client(
            ScriptedTransport::default()
                .respond(200, r#"{"files":[]}"#)
                .respond(500, ""),
        );

        let err = client
            .create_or_update_versioned_file("v2", "strings.json", &path, "/%file_name%")
            .await
            .unwrap_err();

        assert!(matches!(err, CrowdinError::Status(500)));
        assert_eq!(client.transport.endpoints(), vec!["info", "add-directory"]);
    }

    #[tokio::test]
    async fn test_versioned_file_missing_source_sends_no_upload() {
        let dir = tempfile::tempdir().unwrap();
        let tree = r#"{"files":[{"node_type":"branch","name":"v2","files":[]}]}"#;
        let client = api_key_client(ScriptedTransport::default().respond(200, tree));

        let err = client
            .create_or_update_versioned_file("v2", "gone.json", dir.path().join("gone.json"), "/%file_name%")
            .await
            .unwrap_err();

        assert!(matches!(err, CrowdinError::Io(_)));
        assert_eq!(client.transport.endpoints(), vec!["info"]);
    }

    #[tokio::test]
    async fn test_download_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("all.zip");
        let client = api_key_client(ScriptedTransport::default().respond(200, "PK\u{3}\u{4}"));

        let written = client
            .download_translations_to_file(&dest, None, None)
            .await
            .unwrap();

        assert_eq!(written, 4);
        assert_eq!(std::fs::read(&dest).unwrap(), b"PK\x03\x04");
    }

    #[test]
    fn test_classify() {
        let ok = classify(RawResponse {
            status: 200,
            body: Bytes::from_static(b"raw"),
        });
        assert_eq!(&ok.unwrap()[..], b"raw");

        let remote = classify(RawResponse {
            status: 400,
            body: Bytes::from_static(b"[1]"),
        });
        assert!(matches!(remote, Err(CrowdinError::Remote(_))));

        let status = classify(RawResponse {
            status: 204,
            body: Bytes::new(),
        });
        assert!(matches!(status, Err(CrowdinError::Status(204))));
    }

    #[test]
    fn test_form_part_recorded_name() {
        let part = FormPart::Text {
            name: "branch".into(),
            value: "v2".into(),
        };
        assert_eq!(part.name(), "branch");
    }
}
