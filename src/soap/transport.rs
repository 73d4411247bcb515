use async_trait::async_trait;
use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::core::error::{EodDataError, Result};
use crate::soap::envelope::{build_request, decode_response};
use crate::soap::operation::{Operation, RequestMessage};
use crate::soap::xml::Element;

/// A decoded response: the SOAP body keyed by envelope element name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub body: Element,
}

impl RawResponse {
    pub fn new(body: Element) -> Self {
        RawResponse { body }
    }

    pub fn from_xml(xml: &str) -> Result<Self> {
        Ok(RawResponse::new(decode_response(xml)?))
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn dispatch(&self, operation: Operation, message: &RequestMessage)
    -> Result<RawResponse>;
}

/// Namespace of the SOAP 1.1 WSDL binding extensions.
const WSDL_SOAP_NAMESPACE: &[u8] = b"http://schemas.xmlsoap.org/wsdl/soap/";

/// Where and how to send requests, as published by the WSDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescription {
    pub endpoint: String,
    pub namespace: String,
}

impl ServiceDescription {
    /// Reads the target namespace and the SOAP 1.1 `address` location. The
    /// address element is matched by namespace, whatever its prefix.
    pub fn parse(wsdl: &str) -> Result<Self> {
        let mut reader = NsReader::from_str(wsdl);
        reader.config_mut().trim_text(true);

        let mut namespace = None;
        let mut endpoint = None;

        loop {
            match reader.read_resolved_event()? {
                (resolved, Event::Start(e) | Event::Empty(e)) => {
                    let local = e.local_name();
                    let in_soap_binding = matches!(
                        resolved,
                        ResolveResult::Bound(Namespace(ns)) if ns == WSDL_SOAP_NAMESPACE
                    );

                    if local.as_ref() == b"definitions" && namespace.is_none() {
                        namespace = e
                            .try_get_attribute("targetNamespace")?
                            .map(|a| a.unescape_value().map(|v| v.into_owned()))
                            .transpose()?;
                    } else if local.as_ref() == b"address" && in_soap_binding && endpoint.is_none()
                    {
                        endpoint = e
                            .try_get_attribute("location")?
                            .map(|a| a.unescape_value().map(|v| v.into_owned()))
                            .transpose()?;
                    }
                }
                (_, Event::Eof) => break,
                _ => {}
            }
        }

        Ok(ServiceDescription {
            endpoint: endpoint
                .ok_or_else(|| EodDataError::Wsdl("missing soap:address location".to_string()))?,
            namespace: namespace
                .ok_or_else(|| EodDataError::Wsdl("missing targetNamespace".to_string()))?,
        })
    }
}

/// Sends SOAP 1.1 requests over HTTP to the service described by
/// `{base_url}/data.asmx?WSDL`.
///
/// The WSDL is fetched on the first dispatch and reused afterwards.
pub struct SoapTransport {
    base_url: String,
    http: reqwest::Client,
    service: OnceCell<ServiceDescription>,
}

impl SoapTransport {
    pub fn new(base_url: &str, proxy_url: Option<&str>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent("eoddata/0.1");
        if let Some(proxy_url) = proxy_url.filter(|url| !url.trim().is_empty()) {
            debug!("Using proxy {}", proxy_url);
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(SoapTransport {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: builder.build()?,
            service: OnceCell::new(),
        })
    }

    pub fn wsdl_url(&self) -> String {
        format!("{}/data.asmx?WSDL", self.base_url)
    }

    async fn service(&self) -> Result<&ServiceDescription> {
        self.service
            .get_or_try_init(|| async {
                let url = self.wsdl_url();
                debug!("Requesting service description from {}", url);

                let response = self.http.get(&url).send().await?;
                if !response.status().is_success() {
                    return Err(EodDataError::Wsdl(format!(
                        "HTTP error: {} for {}",
                        response.status(),
                        url
                    )));
                }
                let wsdl = response.text().await?;
                let service = ServiceDescription::parse(&wsdl)?;
                debug!(?service, "Loaded service description");
                Ok::<_, EodDataError>(service)
            })
            .await
    }
}

#[async_trait]
impl Transport for SoapTransport {
    #[instrument(name = "SoapDispatch", skip_all, fields(operation = %operation))]
    async fn dispatch(
        &self,
        operation: Operation,
        message: &RequestMessage,
    ) -> Result<RawResponse> {
        info!(message = ?message.redacted(), "Dispatching {}", operation);
        let service = self.service().await?;

        let request = build_request(&service.namespace, operation, message);
        let response = self
            .http
            .post(&service.endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{}\"", operation.soap_action(&service.namespace)))
            .body(request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(%status, body = %text, "Received SOAP response");

        // Faults arrive with a 500 status and still carry a readable envelope.
        match RawResponse::from_xml(&text) {
            Ok(raw) if status.is_success() => Ok(raw),
            Err(fault @ EodDataError::SoapFault { .. }) => Err(fault),
            Ok(_) | Err(_) if !status.is_success() => Err(EodDataError::HttpStatus {
                status: status.as_u16(),
                operation: operation.to_string(),
            }),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn wsdl(endpoint: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<wsdl:definitions xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
                  xmlns:soap12="http://schemas.xmlsoap.org/wsdl/soap12/"
                  xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
                  targetNamespace="http://ws.eoddata.com/Data">
  <wsdl:service name="Data">
    <wsdl:port name="DataSoap12" binding="tns:DataSoap12">
      <soap12:address location="{endpoint}/soap12" />
    </wsdl:port>
    <wsdl:port name="DataSoap" binding="tns:DataSoap">
      <soap:address location="{endpoint}" />
    </wsdl:port>
  </wsdl:service>
</wsdl:definitions>"#
        )
    }

    const LOGIN_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <LoginResponse xmlns="http://ws.eoddata.com/Data">
      <LoginResult Message="Login Successful" Token="ABC123XYZ000" />
    </LoginResponse>
  </soap:Body>
</soap:Envelope>"#;

    async fn create_mock_server(status: u16, soap_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let endpoint = format!("{}/data.asmx", mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/data.asmx"))
            .and(query_param("WSDL", ""))
            .respond_with(ResponseTemplate::new(200).set_body_string(wsdl(&endpoint)))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/data.asmx"))
            .and(header("SOAPAction", "\"http://ws.eoddata.com/Data/Login\""))
            .and(body_string_contains("<Username>trader</Username>"))
            .respond_with(ResponseTemplate::new(status).set_body_string(soap_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[test]
    fn test_parse_service_description() {
        let service = ServiceDescription::parse(&wsdl("http://ws.eoddata.com/data.asmx")).unwrap();
        assert_eq!(service.endpoint, "http://ws.eoddata.com/data.asmx");
        assert_eq!(service.namespace, "http://ws.eoddata.com/Data");

        let err = ServiceDescription::parse("<definitions/>").unwrap_err();
        assert!(matches!(err, EodDataError::Wsdl(_)));
    }

    #[test]
    fn test_parse_service_description_resolves_binding_namespace() {
        let wsdl = r#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/"
                         xmlns:s11="http://schemas.xmlsoap.org/wsdl/soap/"
                         xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap12/"
                         targetNamespace="http://ws.eoddata.com/Data">
              <service name="Data">
                <port name="DataSoap12"><soap:address location="http://host/soap12" /></port>
                <port name="DataSoap"><s11:address location="http://host/data.asmx" /></port>
              </service>
            </definitions>"#;

        let service = ServiceDescription::parse(wsdl).unwrap();
        assert_eq!(service.endpoint, "http://host/data.asmx");
        assert_eq!(service.namespace, "http://ws.eoddata.com/Data");
    }

    #[test]
    fn test_wsdl_url() {
        let transport = SoapTransport::new("http://localhost:8080/", None).unwrap();
        assert_eq!(transport.wsdl_url(), "http://localhost:8080/data.asmx?WSDL");
    }

    #[tokio::test]
    async fn test_dispatch_fetches_wsdl_once() {
        let mock_server = create_mock_server(200, LOGIN_RESPONSE).await;
        let transport = SoapTransport::new(&mock_server.uri(), None).unwrap();
        let message = RequestMessage::login("trader", "secret");

        for _ in 0..2 {
            let raw = transport.dispatch(Operation::Login, &message).await.unwrap();
            let result = raw
                .body
                .child("login_response")
                .and_then(|r| r.child("login_result"))
                .unwrap();
            assert_eq!(result.attribute("token"), Some("ABC123XYZ000"));
        }
    }

    #[tokio::test]
    async fn test_dispatch_surfaces_soap_faults() {
        let fault = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Server</faultcode>
      <faultstring>Server was unable to process request.</faultstring>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;
        let mock_server = create_mock_server(500, fault).await;
        let transport = SoapTransport::new(&mock_server.uri(), None).unwrap();

        let err = transport
            .dispatch(Operation::Login, &RequestMessage::login("trader", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EodDataError::SoapFault { ref code, ref message }
                if code == "soap:Server" && message == "Server was unable to process request."
        ));
    }

    #[tokio::test]
    async fn test_dispatch_http_error() {
        let mock_server = create_mock_server(503, "Service Unavailable").await;
        let transport = SoapTransport::new(&mock_server.uri(), None).unwrap();

        let err = transport
            .dispatch(Operation::Login, &RequestMessage::login("trader", "secret"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP error: 503 for operation: Login");
    }

    #[tokio::test]
    async fn test_dispatch_through_proxy() {
        let proxy = MockServer::start().await;
        let endpoint = "http://eoddata.invalid/data.asmx";

        Mock::given(method("GET"))
            .and(path("/data.asmx"))
            .and(query_param("WSDL", ""))
            .respond_with(ResponseTemplate::new(200).set_body_string(wsdl(endpoint)))
            .expect(1)
            .mount(&proxy)
            .await;
        Mock::given(method("POST"))
            .and(path("/data.asmx"))
            .and(header("SOAPAction", "\"http://ws.eoddata.com/Data/Login\""))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_RESPONSE))
            .expect(1)
            .mount(&proxy)
            .await;

        let transport = SoapTransport::new("http://eoddata.invalid", Some(&proxy.uri())).unwrap();
        let raw = transport
            .dispatch(Operation::Login, &RequestMessage::login("trader", "secret"))
            .await
            .unwrap();
        assert!(raw.body.child("login_response").is_some());

        let requests = proxy.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(
            requests
                .iter()
                .all(|r| r.url.host_str() == Some("eoddata.invalid"))
        );
    }

    #[tokio::test]
    async fn test_blank_proxy_is_ignored() {
        let mock_server = create_mock_server(200, LOGIN_RESPONSE).await;
        let transport = SoapTransport::new(&mock_server.uri(), Some("  ")).unwrap();

        let raw = transport
            .dispatch(Operation::Login, &RequestMessage::login("trader", "secret"))
            .await
            .unwrap();
        assert!(raw.body.child("login_response").is_some());
    }

    #[tokio::test]
    async fn test_missing_wsdl() {
        let mock_server = MockServer::start().await;
        let transport = SoapTransport::new(&mock_server.uri(), None).unwrap();

        let err = transport
            .dispatch(Operation::Login, &RequestMessage::login("trader", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, EodDataError::Wsdl(_)));
    }
}
