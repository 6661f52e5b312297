//! Integration tests for the coloringd reconciliation workflow
//!
//! Tests the full pass over a topology view:
//! - Color assignment and stability
//! - Per-neighbor probe flow installation
//! - Idempotence across repeated passes
//! - Per-pair failure containment and retry
//! - Color report projection

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use coloringd::{
    color_snapshot, color_to_field, ColorSync, ColorValue, ColoringConfig, ColoringError,
    FieldKind, FlowDescriptor, FlowHandle, FlowPusher, Link, Result, SwitchInfo, TopologyView,
};

const DPID_1: &str = "00:00:00:00:00:00:00:01";
const DPID_2: &str = "00:00:00:00:00:00:00:02";
const DPID_3: &str = "00:00:00:00:00:00:00:03";

/// Test fixture: a reconciler wired to a recording flow pusher.
struct TestSetup {
    sync: ColorSync,
    pusher: Arc<MockFlowManager>,
}

impl TestSetup {
    fn new() -> Self {
        Self::with_config(ColoringConfig::default())
    }

    fn with_config(config: ColoringConfig) -> Self {
        let pusher = Arc::new(MockFlowManager::default());
        let sync = ColorSync::new(&config, pusher.clone());
        Self { sync, pusher }
    }
}

/// Flow manager double: records accepted pushes, rejects pushes for
/// switches marked as failing.
#[derive(Default)]
struct MockFlowManager {
    accepted: Mutex<Vec<(String, FlowDescriptor)>>,
    failing: Mutex<HashSet<String>>,
}

impl MockFlowManager {
    fn fail_switch(&self, dpid: &str) {
        self.failing.lock().unwrap().insert(dpid.to_string());
    }

    fn recover_all(&self) {
        self.failing.lock().unwrap().clear();
    }

    fn accepted(&self) -> Vec<(String, FlowDescriptor)> {
        self.accepted.lock().unwrap().clone()
    }

    fn accepted_for(&self, dpid: &str) -> Vec<FlowDescriptor> {
        self.accepted
            .lock()
            .unwrap()
            .iter()
            .filter(|(d, _)| d == dpid)
            .map(|(_, f)| f.clone())
            .collect()
    }
}

#[async_trait]
impl FlowPusher for MockFlowManager {
    async fn push_flow(&self, dpid: &str, flow: &FlowDescriptor) -> Result<FlowHandle> {
        if self.failing.lock().unwrap().contains(dpid) {
            return Err(ColoringError::flow_push(dpid, 503));
        }
        let mut accepted = self.accepted.lock().unwrap();
        accepted.push((dpid.to_string(), flow.clone()));
        Ok(FlowHandle(format!("flow-{}", accepted.len())))
    }
}

fn view(switches: &[(&str, &str)], links: &[(&str, &str)]) -> TopologyView {
    TopologyView {
        switches: switches
            .iter()
            .map(|(dpid, version)| SwitchInfo::new(*dpid, version))
            .collect(),
        links: links.iter().map(|(a, b)| Link::new(*a, *b)).collect(),
    }
}

#[tokio::test]
async fn test_full_coloring_workflow() {
    let mut setup = TestSetup::new();
    let topology = view(
        &[(DPID_1, "0x04"), (DPID_2, "0x04"), (DPID_3, "0x01")],
        &[(DPID_1, DPID_2), (DPID_2, DPID_3)],
    );

    let summary = setup.sync.update_colors(&topology).await;

    // DPID_2 has two neighbors, the others one each: four pairs total
    assert_eq!(summary.pushed, 4);
    assert_eq!(summary.failed, 0);

    // Every pushed flow matches the neighbor's color and punts to the
    // controller port for the switch's protocol version
    let to_3 = setup.pusher.accepted_for(DPID_3);
    assert_eq!(to_3.len(), 1);
    assert_eq!(
        to_3[0].match_fields["dl_src"],
        color_to_field(2, FieldKind::DlSrc)
    );
    let json = serde_json::to_value(&to_3[0]).unwrap();
    assert_eq!(json["actions"][0]["port"], 0xfffd); // OF1.0 sentinel

    let to_2 = setup.pusher.accepted_for(DPID_2);
    assert_eq!(to_2.len(), 2);
    for flow in &to_2 {
        let json = serde_json::to_value(flow).unwrap();
        assert_eq!(json["actions"][0]["port"], 0xffff_fffdu32 as u64); // OF1.3 sentinel
        assert_eq!(json["priority"], 50001);
        assert_eq!(json["table_id"], 0);
    }
}

#[tokio::test]
async fn test_repeated_passes_push_nothing_new() {
    let mut setup = TestSetup::new();
    let topology = view(
        &[(DPID_1, "0x04"), (DPID_2, "0x04")],
        &[(DPID_1, DPID_2)],
    );

    setup.sync.update_colors(&topology).await;
    assert_eq!(setup.pusher.accepted().len(), 2);

    for _ in 0..3 {
        let summary = setup.sync.update_colors(&topology).await;
        assert_eq!(summary.pushed, 0);
    }
    assert_eq!(setup.pusher.accepted().len(), 2);
}

#[tokio::test]
async fn test_colors_survive_topology_churn() {
    let mut setup = TestSetup::new();

    setup
        .sync
        .update_colors(&view(&[(DPID_1, "0x04")], &[]))
        .await;
    let before = setup.sync.table().color(DPID_1).unwrap();

    // Links come and go; the color never changes
    setup
        .sync
        .update_colors(&view(
            &[(DPID_1, "0x04"), (DPID_2, "0x04")],
            &[(DPID_1, DPID_2)],
        ))
        .await;
    setup
        .sync
        .update_colors(&view(&[(DPID_1, "0x04")], &[]))
        .await;

    assert_eq!(setup.sync.table().color(DPID_1).unwrap(), before);
}

#[tokio::test]
async fn test_failure_containment_and_retry() {
    let mut setup = TestSetup::new();
    let topology = view(
        &[(DPID_1, "0x04"), (DPID_2, "0x04"), (DPID_3, "0x04")],
        &[(DPID_1, DPID_2), (DPID_1, DPID_3)],
    );

    // All pushes to DPID_1 fail; everyone else succeeds
    setup.pusher.fail_switch(DPID_1);
    let summary = setup.sync.update_colors(&topology).await;
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.pushed, 2);

    // Next pass retries exactly the failed pairs
    setup.pusher.recover_all();
    let summary = setup.sync.update_colors(&topology).await;
    assert_eq!(summary.pushed, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(setup.pusher.accepted_for(DPID_1).len(), 2);

    // And the pass after that is a no-op
    let summary = setup.sync.update_colors(&topology).await;
    assert_eq!(summary.pushed, 0);
}

#[tokio::test]
async fn test_self_link_installs_single_flow() {
    let mut setup = TestSetup::new();
    let topology = view(&[(DPID_1, "0x04")], &[(DPID_1, DPID_1)]);

    let summary = setup.sync.update_colors(&topology).await;
    assert_eq!(summary.pushed, 1);

    let flows = setup.pusher.accepted_for(DPID_1);
    assert_eq!(flows.len(), 1);
    assert_eq!(
        flows[0].match_fields["dl_src"],
        ColorValue::Text("ee:ee:ee:ee:ee:01".to_string())
    );
}

#[tokio::test]
async fn test_neighbor_loss_keeps_installed_flows() {
    let mut setup = TestSetup::new();

    setup
        .sync
        .update_colors(&view(
            &[(DPID_1, "0x04"), (DPID_2, "0x04")],
            &[(DPID_1, DPID_2)],
        ))
        .await;

    // The link disappears; nothing is deleted and nothing is pushed
    let summary = setup
        .sync
        .update_colors(&view(&[(DPID_1, "0x04"), (DPID_2, "0x04")], &[]))
        .await;
    assert_eq!(summary.pushed, 0);
    assert!(setup.sync.table().is_installed(DPID_1, DPID_2));
    assert!(setup.sync.table().is_installed(DPID_2, DPID_1));

    // When the link returns, the pairs are already installed
    let summary = setup
        .sync
        .update_colors(&view(
            &[(DPID_1, "0x04"), (DPID_2, "0x04")],
            &[(DPID_1, DPID_2)],
        ))
        .await;
    assert_eq!(summary.pushed, 0);
}

#[tokio::test]
async fn test_unknown_version_switch_receives_no_flows() {
    let mut setup = TestSetup::new();
    let topology = view(
        &[(DPID_1, "0x09"), (DPID_2, "0x04")],
        &[(DPID_1, DPID_2)],
    );

    setup.sync.update_colors(&topology).await;
    assert!(setup.pusher.accepted_for(DPID_1).is_empty());
    assert_eq!(setup.pusher.accepted_for(DPID_2).len(), 1);

    // Once the controller reports a supported version, the pending pair
    // is installed on the next pass
    let upgraded = view(
        &[(DPID_1, "0x04"), (DPID_2, "0x04")],
        &[(DPID_1, DPID_2)],
    );
    let summary = setup.sync.update_colors(&upgraded).await;
    assert_eq!(summary.pushed, 1);
    assert_eq!(setup.pusher.accepted_for(DPID_1).len(), 1);
}

#[tokio::test]
async fn test_color_report_after_reconciliation() {
    let mut setup = TestSetup::new();
    setup
        .sync
        .update_colors(&view(
            &[(DPID_1, "0x04"), (DPID_2, "0x04")],
            &[(DPID_1, DPID_2)],
        ))
        .await;

    let report = color_snapshot(setup.sync.table(), setup.sync.color_field());
    assert_eq!(report.len(), 2);
    assert_eq!(report[DPID_1].color_field, FieldKind::DlSrc);
    assert_eq!(
        report[DPID_1].color_value,
        ColorValue::Text("ee:ee:ee:ee:ee:01".to_string())
    );
    assert_eq!(
        report[DPID_2].color_value,
        ColorValue::Text("ee:ee:ee:ee:ee:02".to_string())
    );
}

#[tokio::test]
async fn test_alternate_color_field() {
    let mut setup = TestSetup::with_config(ColoringConfig {
        color_field: FieldKind::InPort,
        ..Default::default()
    });

    setup
        .sync
        .update_colors(&view(&[(DPID_1, "0x04")], &[(DPID_1, DPID_1)]))
        .await;

    let flows = setup.pusher.accepted_for(DPID_1);
    assert_eq!(flows[0].match_fields["in_port"], ColorValue::Number(1));
}
