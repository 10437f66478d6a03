use async_trait::async_trait;
use siri_hub::{
    AdapterRegistry, BrokerClient, DatasetLineFilter, DeliveryEncoder, DeliveryHeaders,
    EncodeError, HttpPushClient, HubCapabilities, HubSettings, ProtocolVersion, RequestType,
    ServiceDelivery, ServiceStyle, SiriDataKind, SiriHub, SubscriptionMode, SubscriptionSetup,
    TransportError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub(crate) const INBOUND_BASE_URL: &str = "https://hub.example/inbound";

/// One recorded POST: url, headers, decoded body.
pub(crate) type RecordedPost = (String, DeliveryHeaders, ServiceDelivery);

#[derive(Default)]
pub(crate) struct RecordingHttpClient {
    pub(crate) posts: Mutex<Vec<RecordedPost>>,
    pub(crate) refuse_connections: bool,
}

impl RecordingHttpClient {
    #[allow(dead_code)]
    pub(crate) fn refusing() -> Self {
        Self {
            posts: Mutex::new(Vec::new()),
            refuse_connections: true,
        }
    }

    #[allow(dead_code)]
    pub(crate) async fn post_count(&self) -> usize {
        self.posts.lock().await.len()
    }
}

#[async_trait]
impl HttpPushClient for RecordingHttpClient {
    async fn post(
        &self,
        url: &str,
        headers: &DeliveryHeaders,
        body: Vec<u8>,
        _timeout: Duration,
    ) -> Result<(), TransportError> {
        let delivery: ServiceDelivery =
            serde_json::from_slice(&body).expect("recorded body should decode");
        self.posts
            .lock()
            .await
            .push((url.to_string(), headers.clone(), delivery));
        if self.refuse_connections {
            return Err(TransportError::ConnectionRefused(url.to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct CountingBroker {
    pub(crate) publishes: AtomicUsize,
}

impl CountingBroker {
    #[allow(dead_code)]
    pub(crate) fn publish_count(&self) -> usize {
        self.publishes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrokerClient for CountingBroker {
    async fn publish(
        &self,
        _destination: &str,
        _body: Vec<u8>,
        _time_to_live: Duration,
    ) -> Result<(), TransportError> {
        self.publishes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) struct JsonEncoder;

impl DeliveryEncoder for JsonEncoder {
    fn encode(&self, delivery: &ServiceDelivery) -> Result<Vec<u8>, EncodeError> {
        serde_json::to_vec(delivery).map_err(|err| EncodeError::new(err.to_string()))
    }
}

pub(crate) fn make_hub(
    name: &str,
    http: Arc<RecordingHttpClient>,
    broker: Arc<CountingBroker>,
) -> SiriHub {
    make_hub_with_settings(name, HubSettings::new(INBOUND_BASE_URL), http, broker)
}

#[allow(dead_code)]
pub(crate) fn make_hub_with_settings(
    name: &str,
    settings: HubSettings,
    http: Arc<RecordingHttpClient>,
    broker: Arc<CountingBroker>,
) -> SiriHub {
    SiriHub::new(
        name,
        settings,
        AdapterRegistry::new(),
        HubCapabilities {
            filter: Arc::new(DatasetLineFilter),
            http,
            broker,
            encoder: Arc::new(JsonEncoder),
        },
    )
}

pub(crate) fn declared_setup(
    internal_id: u32,
    subscription_id: &str,
    kind: SiriDataKind,
) -> SubscriptionSetup {
    let mut urls = HashMap::new();
    urls.insert(RequestType::Subscribe, "http://feed.example/siri".to_string());
    urls.insert(
        RequestType::DeleteSubscription,
        "http://feed.example/siri".to_string(),
    );

    SubscriptionSetup {
        internal_id,
        subscription_id: subscription_id.to_string(),
        vendor: "vendor-a".to_string(),
        dataset_id: "DST".to_string(),
        requestor_ref: "hub".to_string(),
        content_type: "application/xml".to_string(),
        protocol_version: ProtocolVersion::V2_0,
        service_style: ServiceStyle::Soap,
        subscription_type: kind,
        subscription_mode: SubscriptionMode::Subscribe,
        duration_of_subscription_secs: 86_400,
        heartbeat_interval_secs: 60,
        preview_interval_secs: Some(600),
        urls,
        callback_address: None,
        override_https: false,
        active: true,
        identifier_adapter_id: None,
        data_supply_request_for_initial_delivery: false,
        filter_criteria: None,
        time_to_live_millis: 30_000,
    }
}

/// Polls until `condition` holds or one second elapses.
#[allow(dead_code)]
pub(crate) async fn wait_until<F, Fut>(condition: F)
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within one second");
}
