use chrono::NaiveDate;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

use crate::core::config::{ClientConfig, Credentials};
use crate::core::error::{EodDataError, Result};
use crate::core::registry::ConverterRegistry;
use crate::core::result::{
    LoginResult, OperationResult, QuoteGetResult, QuoteListByDateResult, QuoteListResult,
};
use crate::soap::operation::RequestMessage;
use crate::soap::transport::{SoapTransport, Transport};
use crate::soap::unwrap::unwrap_response;

/// Client for the EODData quotes service.
///
/// The session token is obtained lazily by the first operation that needs
/// one and then reused for the lifetime of the client. Concurrent first use
/// performs a single login round trip.
pub struct EodDataClient<T: Transport = SoapTransport> {
    credentials: Credentials,
    transport: T,
    converters: ConverterRegistry,
    token: OnceCell<String>,
}

impl EodDataClient<SoapTransport> {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = SoapTransport::new(&config.base_url, config.proxy_url.as_deref())?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> EodDataClient<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Result<Self> {
        Ok(EodDataClient {
            credentials: config.credentials.clone(),
            transport,
            converters: config.converter_registry()?,
            token: OnceCell::new(),
        })
    }

    /// Shares an existing registry instead of the one built from the config.
    pub fn with_converters(mut self, converters: ConverterRegistry) -> Self {
        self.converters = converters;
        self
    }

    /// The registry used to adjust prices of quotes returned by this client.
    /// Changes made through it apply to every later price access.
    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    #[instrument(name = "Login", skip(self), fields(username = %self.credentials.username))]
    pub async fn login(&self) -> Result<LoginResult> {
        let message =
            RequestMessage::login(&self.credentials.username, &self.credentials.password);
        let response = self.transport.dispatch(LoginResult::OPERATION, &message).await?;
        let result: LoginResult = unwrap_response(response)?;
        debug!(message = ?result.message(), "Login completed");
        Ok(result)
    }

    /// The session token, logging in on first use.
    ///
    /// A login that returns no token leaves the client unauthenticated and
    /// fails with [`EodDataError::NotAuthenticated`].
    pub async fn token(&self) -> Result<&str> {
        let token = self
            .token
            .get_or_try_init(|| async {
                let result = self.login().await?;
                match result.token() {
                    Some(token) => Ok(token.to_string()),
                    None => {
                        let message = result.message().unwrap_or_default().to_string();
                        warn!(%message, "Login returned no token");
                        Err(EodDataError::NotAuthenticated { message })
                    }
                }
            })
            .await?;
        Ok(token.as_str())
    }

    #[instrument(name = "QuoteGet", skip(self))]
    pub async fn quote(&self, exchange: &str, symbol: &str) -> Result<QuoteGetResult> {
        let message = RequestMessage::quote_get(exchange, symbol, self.token().await?);
        let response = self
            .transport
            .dispatch(QuoteGetResult::OPERATION, &message)
            .await?;
        unwrap_response(response)
    }

    #[instrument(name = "QuoteList", skip(self, symbols), fields(count = symbols.len()))]
    pub async fn quotes<S: AsRef<str> + Sync>(
        &self,
        exchange: &str,
        symbols: &[S],
    ) -> Result<QuoteListResult> {
        let message = RequestMessage::quote_list2(exchange, symbols, self.token().await?);
        let response = self
            .transport
            .dispatch(QuoteListResult::OPERATION, &message)
            .await?;
        unwrap_response(response)
    }

    #[instrument(name = "QuoteListByDate", skip(self), fields(quote_date = %quote_date))]
    pub async fn quotes_by_date(
        &self,
        exchange: &str,
        quote_date: NaiveDate,
    ) -> Result<QuoteListByDateResult> {
        let message = RequestMessage::quote_list_by_date(exchange, quote_date, self.token().await?);
        let response = self
            .transport
            .dispatch(QuoteListByDateResult::OPERATION, &message)
            .await?;
        unwrap_response(response)
    }
}
