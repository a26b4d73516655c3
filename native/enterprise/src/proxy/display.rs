//! Wi-Fi display (Miracast) and screen casting.

use tracing::{error, instrument};

use super::{ServiceProxy, or_sentinel, report, unexpected_event};
use crate::{
    codec,
    error::Result,
    models::*,
    remote::{RemoteCall, RemoteEvent, RemoteQuery, RemoteValue, Topic},
};

impl ServiceProxy {
    #[instrument(skip(self, callback))]
    pub async fn init_cast(&self, callback: impl FnOnce(i32) + Send + 'static) {
        self.request(RemoteCall::InitCast, RemoteValue::into_int, callback).await;
    }

    #[instrument(skip(self))]
    pub async fn open_miracast(&self) {
        self.send(RemoteCall::OpenMiracast).await;
    }

    #[instrument(skip(self))]
    pub async fn close_miracast(&self) {
        self.send(RemoteCall::CloseMiracast).await;
    }

    #[instrument(skip(self), ret)]
    pub async fn is_miracast_on(&self) -> bool {
        or_sentinel(self.query(RemoteQuery::IsMiracastOn, RemoteValue::into_bool).await, false)
    }

    /// Starts scanning for displays. Results arrive through the display listeners.
    #[instrument(skip(self))]
    pub async fn start_scan(&self) {
        self.send(RemoteCall::StartScan).await;
    }

    #[instrument(skip(self))]
    pub async fn stop_scan(&self) {
        self.send(RemoteCall::StopScan).await;
    }

    /// Connects to the display described by `model_json`.
    ///
    /// A malformed model is returned as an error whether or not the service is bound.
    #[instrument(skip(self), err)]
    pub async fn connect_wifi_display(&self, model_json: &str) -> Result<()> {
        let model = codec::wifi_display_model_from_json(model_json)?;
        self.send(RemoteCall::ConnectWifiDisplay(model)).await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn disconnect_wifi_display(&self) {
        self.send(RemoteCall::DisconnectWifiDisplay).await;
    }

    #[instrument(skip(self))]
    pub async fn forget_wifi_display(&self, address: &str) {
        self.send(RemoteCall::ForgetWifiDisplay { address: address.to_string() }).await;
    }

    #[instrument(skip(self))]
    pub async fn rename_wifi_display(&self, address: &str, name: &str) {
        let call =
            RemoteCall::RenameWifiDisplay { address: address.to_string(), name: name.to_string() };
        self.send(call).await;
    }

    /// Asks the service to push the current display list to the listeners.
    #[instrument(skip(self))]
    pub async fn update_wifi_displays(&self) {
        self.send(RemoteCall::UpdateWifiDisplays).await;
    }

    /// JSON of the connected display model, `None` when nothing is connected.
    #[instrument(skip(self))]
    pub async fn get_connected_wifi_display(&self) -> Option<String> {
        let model = self
            .query(RemoteQuery::ConnectedWifiDisplay, RemoteValue::into_wifi_display)
            .await
            .map(|model| model.map(|model| codec::wifi_display_model_to_json(&model)));
        match or_sentinel(model, None) {
            Some(Ok(json)) => Some(json),
            Some(Err(e)) => {
                report(&e);
                None
            }
            None => None,
        }
    }

    /// Registers `callback` for display list updates, encoded as a JSON array.
    ///
    /// Replaces any display list listener registered earlier.
    #[instrument(skip(self, callback))]
    pub async fn set_wifi_display_models_callback(
        &self,
        callback: impl Fn(String) + Send + Sync + 'static,
    ) {
        let adapt = |event: RemoteEvent| match event {
            RemoteEvent::WifiDisplayModels(models) => {
                match codec::wifi_display_models_to_json(&models) {
                    Ok(json) => Some(json),
                    Err(e) => {
                        error!(
                            error = &e as &dyn std::error::Error,
                            "Failed to encode display models"
                        );
                        None
                    }
                }
            }
            other => unexpected_event(other),
        };
        if let Err(e) = self.listen(Topic::WifiDisplayModels, adapt, callback).await {
            report(&e);
        }
    }

    /// Typed form of [`ServiceProxy::set_wifi_display_models_callback`].
    #[instrument(skip(self, listener))]
    pub async fn set_wifi_display_models_listener(
        &self,
        listener: impl Fn(Vec<WifiDisplayModel>) + Send + Sync + 'static,
    ) {
        let adapt = |event: RemoteEvent| match event {
            RemoteEvent::WifiDisplayModels(models) => Some(models),
            other => unexpected_event(other),
        };
        if let Err(e) = self.listen(Topic::WifiDisplayModels, adapt, listener).await {
            report(&e);
        }
    }

    /// Registers `callback` for the service's raw display JSON.
    #[instrument(skip(self, callback))]
    pub async fn set_wifi_display_json_callback(
        &self,
        callback: impl Fn(String) + Send + Sync + 'static,
    ) {
        let adapt = |event: RemoteEvent| match event {
            RemoteEvent::WifiDisplayJson(json) => Some(json),
            other => unexpected_event(other),
        };
        if let Err(e) = self.listen(Topic::WifiDisplayJson, adapt, callback).await {
            report(&e);
        }
    }

    #[instrument(skip(self), ret)]
    pub async fn get_auto_miracast_config(&self) -> String {
        let config = self.query(RemoteQuery::AutoMiracastConfig, RemoteValue::into_text).await;
        or_sentinel(config, String::new())
    }

    #[instrument(skip(self), ret)]
    pub async fn get_screencast_audio_output(&self) -> ScreencastAudioOutput {
        let query = RemoteQuery::ScreencastAudioOutput;
        let output = self.query(query, RemoteValue::into_enum::<ScreencastAudioOutput>).await;
        or_sentinel(output, ScreencastAudioOutput::Error)
    }

    #[instrument(skip(self), ret)]
    pub async fn set_screencast_audio_output(&self, output: ScreencastAudioOutput) -> i32 {
        let query = RemoteQuery::SetScreencastAudioOutput(output);
        or_sentinel(self.query(query, RemoteValue::into_int).await, 0)
    }

    #[instrument(skip(self), ret)]
    pub async fn get_cast_option(&self, option: CastOption) -> CastOptionValue {
        let query = RemoteQuery::CastOption(option);
        let value = self.query(query, RemoteValue::into_enum::<CastOptionValue>).await;
        or_sentinel(value, CastOptionValue::StatusError)
    }

    #[instrument(skip(self), ret)]
    pub async fn set_cast_option(&self, option: CastOption, value: CastOptionValue) -> i32 {
        let query = RemoteQuery::SetCastOption { option, value };
        or_sentinel(self.query(query, RemoteValue::into_int).await, 0)
    }

    #[instrument(skip(self), ret)]
    pub async fn get_cast_show_authorization(&self) -> i32 {
        or_sentinel(self.query(RemoteQuery::CastShowAuthorization, RemoteValue::into_int).await, 0)
    }

    #[instrument(skip(self), ret)]
    pub async fn set_cast_show_authorization(&self, authorization: i32) -> i32 {
        let query = RemoteQuery::SetCastShowAuthorization(authorization);
        or_sentinel(self.query(query, RemoteValue::into_int).await, 0)
    }

    /// URL other devices can open to watch the cast.
    #[instrument(skip(self), ret)]
    pub async fn get_cast_url(&self, url_type: CastUrlType) -> String {
        let url = self.query(RemoteQuery::CastUrl(url_type), RemoteValue::into_text).await;
        or_sentinel(url, String::new())
    }

    #[instrument(skip(self), ret)]
    pub async fn stop_cast(&self) -> i32 {
        or_sentinel(self.query(RemoteQuery::StopCast, RemoteValue::into_int).await, 0)
    }

    /// Sets the cast bitrate. Returns `-1` when the request could not be made.
    #[instrument(skip(self), ret)]
    pub async fn set_cast_media_format(&self, bitrate: i32) -> i32 {
        let query = RemoteQuery::SetCastMediaFormat { bitrate };
        or_sentinel(self.query(query, RemoteValue::into_int).await, -1)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        dispatch::CallbackDelivery,
        error::ProxyError,
        remote::RemoteError,
        testing::{FakeConnector, bound_proxy, wait_until},
    };

    fn model(name: &str) -> WifiDisplayModel {
        WifiDisplayModel {
            device_address: "8a:3c:1d:00:11:22".to_string(),
            device_name: name.to_string(),
            is_available: true,
            can_connect: true,
            status_code: WifiDisplayStatus::Available.code(),
            ..WifiDisplayModel::default()
        }
    }

    #[test(tokio::test)]
    async fn test_connect_wifi_display_parses_model() {
        let (proxy, remote, _connector) = bound_proxy(CallbackDelivery::Direct).await;
        let json = codec::wifi_display_model_to_json(&model("Meeting Room")).expect("encode");
        proxy.connect_wifi_display(&json).await.expect("connect should succeed");
        assert_eq!(remote.calls(), vec![RemoteCall::ConnectWifiDisplay(model("Meeting Room"))]);
    }

    #[test(tokio::test)]
    async fn test_connect_wifi_display_rejects_malformed_json_when_unbound() {
        let proxy = ServiceProxy::new(FakeConnector::new(), &Default::default());
        let err = proxy.connect_wifi_display("{\"deviceName\": 3").await.unwrap_err();
        assert!(matches!(err, ProxyError::Json(_)));
        let json = codec::wifi_display_model_to_json(&model("TV")).expect("encode");
        proxy.connect_wifi_display(&json).await.expect("unbound is not an error");
    }

    #[test(tokio::test)]
    async fn test_connected_wifi_display() {
        let (proxy, remote, _connector) = bound_proxy(CallbackDelivery::Direct).await;
        assert_eq!(proxy.get_connected_wifi_display().await, None, "no answer is a fault");

        remote.answer("get_connected_wifi_display", RemoteValue::WifiDisplay(None));
        assert_eq!(proxy.get_connected_wifi_display().await, None);

        remote.answer("get_connected_wifi_display", RemoteValue::WifiDisplay(Some(model("TV"))));
        let json = proxy.get_connected_wifi_display().await.expect("connected display");
        assert_eq!(codec::wifi_display_model_from_json(&json).expect("decode"), model("TV"));
    }

    #[test(tokio::test)]
    async fn test_cast_sentinels() {
        let proxy = ServiceProxy::new(FakeConnector::new(), &Default::default());
        assert!(!proxy.is_miracast_on().await);
        assert_eq!(proxy.get_screencast_audio_output().await, ScreencastAudioOutput::Error);
        assert_eq!(
            proxy.get_cast_option(CastOption::ResolutionLevel).await,
            CastOptionValue::StatusError
        );
        assert_eq!(proxy.get_cast_url(CastUrlType::Rtmp).await, "");
        assert_eq!(proxy.stop_cast().await, 0);
        assert_eq!(proxy.set_cast_media_format(4_000_000).await, -1);
    }

    #[test(tokio::test)]
    async fn test_cast_queries() {
        let (proxy, remote, _connector) = bound_proxy(CallbackDelivery::Direct).await;
        remote.answer("get_cast_option", RemoteValue::Ordinal(CastOptionValue::ALL[1].ordinal()));
        remote.answer("get_screencast_audio_output", RemoteValue::Ordinal(99));
        remote.answer("set_cast_media_format", RemoteValue::Int(0));
        assert_eq!(proxy.get_cast_option(CastOption::BitrateLevel).await, CastOptionValue::ALL[1]);
        assert_eq!(
            proxy.get_screencast_audio_output().await,
            ScreencastAudioOutput::Error,
            "unknown ordinal falls back"
        );
        assert_eq!(proxy.set_cast_media_format(8_000_000).await, 0);
        assert_eq!(
            remote.queries().last(),
            Some(&RemoteQuery::SetCastMediaFormat { bitrate: 8_000_000 })
        );

        remote.fail_with(RemoteError::FailedTransaction);
        assert_eq!(proxy.set_cast_media_format(8_000_000).await, -1);
    }

    #[test(tokio::test)]
    async fn test_models_callback_receives_json() {
        let (proxy, remote, _connector) = bound_proxy(CallbackDelivery::Direct).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        proxy
            .set_wifi_display_models_callback(move |json| {
                let _ = tx.send(json);
            })
            .await;

        let models = vec![model("A"), model("B")];
        for event in [models.clone(), Vec::new()] {
            assert!(remote.emit(Topic::WifiDisplayModels, RemoteEvent::WifiDisplayModels(event)));
        }
        let json = rx.recv().await.expect("first event");
        assert_eq!(codec::wifi_display_models_from_json(&json).expect("decode"), models);
        assert_eq!(rx.recv().await.as_deref(), Some("[]"));
    }

    #[test(tokio::test)]
    async fn test_json_callback_passes_through() {
        let (proxy, remote, _connector) = bound_proxy(CallbackDelivery::Direct).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        proxy
            .set_wifi_display_json_callback(move |json| {
                let _ = tx.send(json);
            })
            .await;
        remote.emit(Topic::WifiDisplayJson, RemoteEvent::WifiDisplayJson("[{}]".to_string()));
        assert_eq!(rx.recv().await.as_deref(), Some("[{}]"));
    }

    #[test(tokio::test)]
    async fn test_replaced_listener_stops_receiving() {
        let (proxy, remote, _connector) = bound_proxy(CallbackDelivery::Direct).await;
        let (old_tx, mut old_rx) = mpsc::unbounded_channel();
        proxy
            .set_wifi_display_models_listener(move |models| {
                let _ = old_tx.send(models);
            })
            .await;
        let (new_tx, mut new_rx) = mpsc::unbounded_channel();
        proxy
            .set_wifi_display_models_listener(move |models| {
                let _ = new_tx.send(models);
            })
            .await;

        remote.emit(Topic::WifiDisplayModels, RemoteEvent::WifiDisplayModels(vec![model("C")]));
        assert_eq!(new_rx.recv().await, Some(vec![model("C")]));
        assert_eq!(old_rx.recv().await, None, "replaced forwarder is cancelled");
    }

    #[test(tokio::test)]
    async fn test_unbind_cancels_listeners() {
        let (proxy, remote, _connector) = bound_proxy(CallbackDelivery::Direct).await;
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        proxy
            .set_wifi_display_json_callback(move |json| {
                let _ = tx.send(json);
            })
            .await;

        proxy.unbind().await;
        wait_until(|| remote.listener_closed(Topic::WifiDisplayJson)).await;
        let event = RemoteEvent::WifiDisplayJson("[]".to_string());
        assert!(!remote.emit(Topic::WifiDisplayJson, event));
        assert_eq!(rx.recv().await, None);
    }
}
