//! Large-space scenes, their maps, and marker tracking.

use std::error::Error;

use tracing::{error, instrument};

use super::{ServiceProxy, or_sentinel, report, unexpected_event};
use crate::{
    codec,
    models::{MarkerInfo, MarkerTracking},
    remote::{RemoteCall, RemoteEvent, RemoteQuery, RemoteValue, Topic},
};

impl ServiceProxy {
    #[instrument(skip(self, callback))]
    pub async fn switch_large_space_scene(
        &self,
        open: bool,
        callback: impl FnOnce(bool) + Send + 'static,
    ) {
        self.request(RemoteCall::SwitchLargeSpaceScene { open }, RemoteValue::into_bool, callback)
            .await;
    }

    /// The callback receives the service's status text for the large-space scene.
    #[instrument(skip(self, callback))]
    pub async fn get_large_space_status(&self, callback: impl FnOnce(String) + Send + 'static) {
        self.request(RemoteCall::GetLargeSpaceStatus, RemoteValue::into_text, callback).await;
    }

    #[instrument(skip(self), ret)]
    pub async fn save_large_space_maps(&self) -> bool {
        let result = self.query(RemoteQuery::SaveLargeSpaceMaps, RemoteValue::into_bool).await;
        or_sentinel(result, false)
    }

    #[instrument(skip(self, callback))]
    pub async fn export_maps(&self, callback: impl FnOnce(bool) + Send + 'static) {
        self.request(RemoteCall::ExportMaps, RemoteValue::into_bool, callback).await;
    }

    #[instrument(skip(self, callback))]
    pub async fn import_maps(&self, callback: impl FnOnce(bool) + Send + 'static) {
        self.request(RemoteCall::ImportMaps, RemoteValue::into_bool, callback).await;
    }

    /// Registers `callback` for tracked markers, converted into the
    /// application's frame as described by `tracking`.
    ///
    /// Returns the service's registration result, or `-1` when the listener
    /// could not be registered.
    #[instrument(skip(self, callback))]
    pub async fn set_marker_info_callback(
        &self,
        tracking: MarkerTracking,
        callback: impl Fn(Vec<MarkerInfo>) + Send + Sync + 'static,
    ) -> i32 {
        let adapt = move |event: RemoteEvent| match event {
            RemoteEvent::MarkerInfos(markers) => {
                let converted = markers.iter().map(|marker| marker.to_app_frame(&tracking));
                Some(converted.collect::<Vec<_>>())
            }
            other => unexpected_event(other),
        };
        self.listen(Topic::MarkerInfos, adapt, callback).await.unwrap_or_else(|e| {
            report(&e);
            -1
        })
    }

    /// Registers `callback` for tracked markers as a JSON array, in the
    /// service's own frame.
    #[instrument(skip(self, callback))]
    pub async fn set_marker_info_json_callback(
        &self,
        callback: impl Fn(String) + Send + Sync + 'static,
    ) -> i32 {
        let adapt = |event: RemoteEvent| match event {
            RemoteEvent::MarkerInfos(markers) => match codec::marker_infos_to_json(&markers) {
                Ok(json) => Some(json),
                Err(e) => {
                    error!(error = &e as &dyn Error, "Failed to encode markers");
                    None
                }
            },
            other => unexpected_event(other),
        };
        self.listen(Topic::MarkerInfos, adapt, callback).await.unwrap_or_else(|e| {
            report(&e);
            -1
        })
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        dispatch::CallbackDelivery,
        models::TrackingOrigin,
        remote::RemoteError,
        testing::{FakeConnector, bound_proxy, capture, captured, settle},
    };

    fn marker(id: i32) -> MarkerInfo {
        MarkerInfo {
            pos_x: 0.5,
            pos_y: 1.0,
            pos_z: 2.0,
            rotation_x: 0.1,
            rotation_y: 0.2,
            rotation_z: 0.3,
            rotation_w: 0.9,
            valid_flag: 1,
            marker_type: 0,
            marker_id: id,
            timestamp: 1000.0,
            reserve: vec![0; 3],
        }
    }

    #[test(tokio::test)]
    async fn test_large_space_status() {
        let (proxy, remote, _connector) = bound_proxy(CallbackDelivery::Direct).await;
        let (callback, status) = capture();
        proxy.get_large_space_status(callback).await;
        remote.complete("get_large_space_status", RemoteValue::Text("open".to_string()));
        assert_eq!(captured(status).await.as_deref(), Some("open"));
    }

    #[test(tokio::test)]
    async fn test_map_transfers() {
        let (proxy, remote, _connector) = bound_proxy(CallbackDelivery::Direct).await;
        let (export_callback, exported) = capture();
        let (import_callback, imported) = capture();
        proxy.export_maps(export_callback).await;
        proxy.import_maps(import_callback).await;
        assert_eq!(remote.pending(), vec!["export_maps", "import_maps"]);

        remote.complete("import_maps", RemoteValue::Bool(false));
        remote.complete("export_maps", RemoteValue::Bool(true));
        assert_eq!(captured(exported).await, Some(true));
        assert_eq!(captured(imported).await, Some(false));
    }

    #[test(tokio::test)]
    async fn test_save_maps() {
        let (proxy, remote, _connector) = bound_proxy(CallbackDelivery::Direct).await;
        remote.answer("save_large_space_maps", RemoteValue::Bool(true));
        assert!(proxy.save_large_space_maps().await);
        remote.fail_with(RemoteError::DeadObject);
        assert!(!proxy.save_large_space_maps().await);
    }

    #[test(tokio::test)]
    async fn test_markers_converted_to_app_frame() {
        let (proxy, remote, _connector) = bound_proxy(CallbackDelivery::Direct).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let tracking = MarkerTracking {
            origin: TrackingOrigin::Device,
            camera_y_offset: 1.5,
            origin_height: 0.25,
        };
        let code = proxy
            .set_marker_info_callback(tracking, move |markers| {
                let _ = tx.send(markers);
            })
            .await;
        assert_eq!(code, 0);

        remote.emit(Topic::MarkerInfos, RemoteEvent::MarkerInfos(vec![marker(7)]));
        let markers = rx.recv().await.expect("markers");
        assert_eq!(markers.len(), 1);
        let converted = &markers[0];
        assert_eq!(converted.marker_id, 7);
        assert_eq!(converted.pos_x, 0.5);
        assert_eq!(converted.pos_y, 2.75);
        assert_eq!(converted.pos_z, -2.0);
        assert_eq!(converted.rotation_x, -0.1);
        assert_eq!(converted.rotation_y, -0.2);
        assert_eq!(converted.rotation_z, 0.3);
        assert_eq!(converted.rotation_w, 0.9);
    }

    #[test(tokio::test)]
    async fn test_marker_json_callback() {
        let (proxy, remote, _connector) = bound_proxy(CallbackDelivery::Direct).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        proxy
            .set_marker_info_json_callback(move |json| {
                let _ = tx.send(json);
            })
            .await;

        remote.emit(Topic::MarkerInfos, RemoteEvent::MarkerInfos(vec![marker(1), marker(2)]));
        remote.emit(Topic::MarkerInfos, RemoteEvent::WifiDisplayJson("[]".to_string()));
        remote.emit(Topic::MarkerInfos, RemoteEvent::MarkerInfos(Vec::new()));

        let json = rx.recv().await.expect("markers");
        let decoded = codec::marker_infos_from_json(&json).expect("decode");
        assert_eq!(decoded, vec![marker(1), marker(2)]);
        assert_eq!(rx.recv().await.as_deref(), Some("[]"), "mismatched event skipped");
    }

    #[test(tokio::test)]
    async fn test_marker_callback_unbound() {
        let proxy = ServiceProxy::new(FakeConnector::new(), &Default::default());
        assert_eq!(proxy.set_marker_info_callback(MarkerTracking::default(), |_| {}).await, -1);
        assert_eq!(proxy.set_marker_info_json_callback(|_| {}).await, -1);
    }

    #[test(tokio::test)]
    async fn test_queued_markers_wait_for_drain() {
        let (proxy, remote, _connector) = bound_proxy(CallbackDelivery::Queued).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        proxy
            .set_marker_info_json_callback(move |json| {
                let _ = tx.send(json);
            })
            .await;
        remote.emit(Topic::MarkerInfos, RemoteEvent::MarkerInfos(vec![marker(3)]));
        settle().await;
        assert!(rx.try_recv().is_err());
        assert_eq!(proxy.run_pending_callbacks(), 1);
        assert!(rx.try_recv().is_ok());
    }
}
