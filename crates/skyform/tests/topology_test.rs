use serde_json::json;
use skyform::{StackSettings, declare_topology, run_preview};
use skyform_cloud::{CloudError, Context, PreviewEngine, REDACTED};
use skyform_cloud_aliyun::cs::SERVERLESS_KUBERNETES_TYPE;
use skyform_cloud_aliyun::ecs::{INSTANCE_TYPE, SECURITY_GROUP_RULE_TYPE, SECURITY_GROUP_TYPE};
use skyform_cloud_aliyun::preview;
use skyform_cloud_aliyun::vpc::{NETWORK_TYPE, SWITCH_TYPE};
use skyform_config::StackConfig;
use std::sync::{Arc, Mutex};

fn settings(region: &str) -> StackSettings {
    let config = StackConfig::parse(&format!(
        r#"
        config "koderover" {{
            org "acme"
            project "zadig"
            timezone "Asia/Shanghai"
            zadig-ecs-passwd secure="UGFzc3cwcmQh"
        }}
        config "alicloud" {{
            region "{}"
        }}
        "#,
        region
    ))
    .unwrap();
    StackSettings::from_config(&config, "dev", "/home/ops").unwrap()
}

fn zones(region: &str) -> Vec<String> {
    vec![format!("{}-a", region), format!("{}-b", region)]
}

/// tracingの出力を溜めるバッファ
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// 命名・CIDR・タグが揃っていることを確認
#[tokio::test]
async fn test_names_blocks_and_tags() {
    let engine = Arc::new(preview::engine(zones("cn-hangzhou")));
    let ctx = Context::new("zadig", "dev", engine.clone());

    let topology = declare_topology(&ctx, &settings("cn-hangzhou")).await.unwrap();
    let summary = ctx.finish().await.unwrap();

    // vpc + 2 vswitches + sg + 3 rules + instance
    assert_eq!(summary.declared, 8);
    assert_eq!(topology.zones, zones("cn-hangzhou"));

    let vpc = &engine.records_of(NETWORK_TYPE)[0];
    assert_eq!(vpc.name, "acme-zadig-dev");
    assert_eq!(vpc.props["vpcName"], json!("acme-zadig-dev"));
    assert_eq!(vpc.props["cidrBlock"], json!("10.0.0.0/16"));

    let mut switches = engine.records_of(SWITCH_TYPE);
    switches.sort_by(|a, b| a.name.cmp(&b.name));
    let layout: Vec<_> = switches
        .iter()
        .map(|s| {
            (
                s.name.as_str(),
                s.get_str("cidrBlock").unwrap(),
                s.get_str("zoneId").unwrap(),
            )
        })
        .collect();
    assert_eq!(
        layout,
        vec![
            ("acme-zadig-dev-a", "10.0.0.0/24", "cn-hangzhou-a"),
            ("acme-zadig-dev-b", "10.0.1.0/24", "cn-hangzhou-b"),
        ]
    );

    let sg = &engine.records_of(SECURITY_GROUP_TYPE)[0];
    assert_eq!(sg.name, "acme-zadig-dev-default");
    assert_eq!(sg.props["innerAccessPolicy"], json!("Accept"));

    let expected_tags = json!({"org": "acme", "project": "zadig", "stack": "dev"});
    for record in engine.records() {
        if record.type_token != SECURITY_GROUP_RULE_TYPE {
            assert_eq!(record.props["tags"], expected_tags, "tags of {}", record.name);
        }
    }
}

/// 依存リソースのIDが正しく渡されることを確認
#[tokio::test]
async fn test_dependencies_are_wired() {
    let engine = Arc::new(preview::engine(zones("cn-hangzhou")));
    let ctx = Context::new("zadig", "dev", engine.clone());

    let topology = declare_topology(&ctx, &settings("cn-hangzhou")).await.unwrap();
    ctx.finish().await.unwrap();

    let vpc_id = topology.network.id().resolve().await.unwrap();
    let sg_id = topology.security_group.id().resolve().await.unwrap();
    let switch_ids = topology.vswitch_ids.resolve().await.unwrap();
    assert_eq!(switch_ids.len(), 2);

    for switch in engine.records_of(SWITCH_TYPE) {
        assert_eq!(switch.get_str("vpcId"), Some(vpc_id.as_str()));
    }
    assert_eq!(
        engine.records_of(SECURITY_GROUP_TYPE)[0].get_str("vpcId"),
        Some(vpc_id.as_str())
    );

    let rules = engine.records_of(SECURITY_GROUP_RULE_TYPE);
    let names: Vec<_> = rules.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["icmp", "tcp-22", "tcp-zadig"]);
    for rule in &rules {
        assert_eq!(rule.get_str("securityGroupId"), Some(sg_id.as_str()));
        assert_eq!(rule.get_str("cidrIp"), Some("0.0.0.0/0"));
        assert_eq!(rule.get_str("type"), Some("ingress"));
    }
    assert_eq!(rules[1].get_str("portRange"), Some("22/22"));
    assert_eq!(rules[2].get_str("portRange"), Some("30000/30000"));
    assert_eq!(topology.rule_ids.resolve().await.unwrap().len(), 3);

    let instance = &engine.records_of(INSTANCE_TYPE)[0];
    assert!(switch_ids.iter().any(|id| instance.get_str("vswitchId") == Some(id.as_str())));
    assert_eq!(instance.props["securityGroups"], json!([sg_id]));
    assert_eq!(instance.props["imageId"], json!("ubuntu_20_04_x64_20G_alibase_20210927.vhd"));
    assert_eq!(instance.props["systemDiskSize"], json!(30));
    assert_eq!(instance.props["internetMaxBandwidthOut"], json!(5));
    assert_eq!(instance.props["status"], json!("Running"));
    assert_eq!(instance.props["deletionProtection"], json!(true));
}

/// ASKクラスタは cn-wulanchabu でのみ作成される
#[tokio::test]
async fn test_cluster_only_in_wulanchabu() {
    let engine = Arc::new(preview::engine(zones("cn-hangzhou")));
    let ctx = Context::new("zadig", "dev", engine.clone());
    let topology = declare_topology(&ctx, &settings("cn-hangzhou")).await.unwrap();
    ctx.finish().await.unwrap();
    assert!(topology.cluster.is_none());
    assert!(engine.records_of(SERVERLESS_KUBERNETES_TYPE).is_empty());

    let engine = Arc::new(preview::engine(zones("cn-wulanchabu")));
    let ctx = Context::new("zadig", "dev", engine.clone());
    let topology = declare_topology(&ctx, &settings("cn-wulanchabu")).await.unwrap();
    ctx.finish().await.unwrap();
    assert!(topology.cluster.is_some());

    let clusters = engine.records_of(SERVERLESS_KUBERNETES_TYPE);
    assert_eq!(clusters.len(), 1);
    let cluster = &clusters[0];
    assert_eq!(cluster.name, "acme-zadig-dev");
    assert_eq!(cluster.get_str("kubeConfig"), Some("/home/ops/.kube/config.ask.dev"));
    assert_eq!(cluster.get_str("version"), Some("v1.20.11-aliyun.1"));
    assert_eq!(cluster.get_str("serviceCidr"), Some("172.16.0.0/24"));
    assert_eq!(cluster.get_str("timeZone"), Some("Asia/Shanghai"));
    assert_eq!(cluster.props["serviceDiscoveryTypes"], json!(["CoreDNS"]));
    assert_eq!(cluster.props["vswitchIds"].as_array().map(Vec::len), Some(1));
}

/// 最初のルールが失敗したら残りのルールは宣言されない
#[tokio::test]
async fn test_rule_failure_skips_remaining_rules() {
    let engine = Arc::new(preview::engine(zones("cn-hangzhou")).fail_resource("icmp"));
    let ctx = Context::new("zadig", "dev", engine.clone());

    let topology = declare_topology(&ctx, &settings("cn-hangzhou")).await.unwrap();
    let result = ctx.finish().await;

    match result {
        Err(CloudError::RunFailed(failures)) => {
            assert!(failures.iter().any(|e| e.to_string().contains("icmp")));
        }
        other => panic!("expected RunFailed, got {:?}", other),
    }
    assert!(engine.records_of(SECURITY_GROUP_RULE_TYPE).is_empty());
    assert!(topology.rule_ids.resolve().await.is_err());

    // 独立したリソースは影響を受けない
    assert_eq!(engine.records_of(INSTANCE_TYPE).len(), 1);
}

/// ルールの失敗はポリシー名付きのエラー行として一度だけ記録される
#[tokio::test]
async fn test_rule_failure_logs_one_error_line() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let engine = Arc::new(preview::engine(zones("cn-hangzhou")).fail_resource("icmp"));
    let ctx = Context::new("zadig", "dev", engine);
    declare_topology(&ctx, &settings("cn-hangzhou")).await.unwrap();
    assert!(ctx.finish().await.is_err());

    let lines = logs.lines();
    let errors: Vec<_> = lines.iter().filter(|l| l.contains(" ERROR ")).collect();
    assert_eq!(errors.len(), 1, "error lines: {:?}", errors);
    assert!(errors[0].contains("SetSecurityGroupPolicy"));
    assert!(errors[0].contains("policy=") && errors[0].contains("icmp"));
    assert!(
        lines
            .iter()
            .any(|l| l.contains(" WARN ") && l.contains("Resource registration failed"))
    );
}

/// 計画は宣言順に並び、マルチスレッドでも実行ごとに変わらない
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_plan_order_is_stable() {
    let region = "cn-shanghai";
    let zone_ids: Vec<String> = ["a", "b", "c", "d", "e", "f"]
        .iter()
        .map(|z| format!("{}-{}", region, z))
        .collect();
    let expected: Vec<String> = ["a", "b", "c", "d", "e", "f"]
        .iter()
        .map(|z| format!("acme-zadig-dev-{}", z))
        .collect();

    for _ in 0..20 {
        let engine = Arc::new(preview::engine(zone_ids.clone()));
        let ctx = Context::new("zadig", "dev", engine.clone());
        let topology = declare_topology(&ctx, &settings(region)).await.unwrap();
        ctx.finish().await.unwrap();

        let plan = engine.plan();
        let switches: Vec<String> = plan
            .resources
            .iter()
            .filter(|r| r.type_token == SWITCH_TYPE)
            .map(|r| r.name.clone())
            .collect();
        assert_eq!(switches, expected);
        assert_eq!(plan.resources[0].type_token, NETWORK_TYPE);

        // 最初のvSwitchは常にゾーン順の先頭
        let first = topology.switches[0].id().resolve().await.unwrap();
        let instance = &engine.records_of(INSTANCE_TYPE)[0];
        assert_eq!(instance.get_str("vswitchId"), Some(first.as_str()));
    }
}

/// 二番目のルールが失敗した場合、最初のルールはロールバックされない
#[tokio::test]
async fn test_rule_failure_keeps_earlier_rules() {
    let engine = Arc::new(preview::engine(zones("cn-hangzhou")).fail_resource("tcp-22"));
    let ctx = Context::new("zadig", "dev", engine.clone());

    declare_topology(&ctx, &settings("cn-hangzhou")).await.unwrap();
    assert!(ctx.finish().await.is_err());

    let rules = engine.records_of(SECURITY_GROUP_RULE_TYPE);
    let names: Vec<_> = rules.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["icmp"]);
}

/// ゾーンが無い場合はvSwitchが見つからずエラーになる（パニックしない）
#[tokio::test]
async fn test_no_zones_fails_without_panic() {
    let engine = Arc::new(preview::engine(Vec::new()));
    let ctx = Context::new("zadig", "dev", engine.clone());

    let topology = declare_topology(&ctx, &settings("cn-hangzhou")).await.unwrap();
    assert!(topology.switches.is_empty());

    let err = ctx.finish().await.unwrap_err();
    assert!(err.to_string().contains("no vSwitch found"));
    assert!(engine.records_of(INSTANCE_TYPE).is_empty());
}

/// ゾーンIDが想定外の形式ならエラー
#[tokio::test]
async fn test_malformed_zone_id() {
    let engine = Arc::new(preview::engine(vec!["cn-hangzhou".to_string()]));
    let ctx = Context::new("zadig", "dev", engine);

    assert!(matches!(
        declare_topology(&ctx, &settings("cn-hangzhou")).await,
        Err(CloudError::InvalidConfig(_))
    ));
}

/// getZones が失敗したら宣言は中断される
#[tokio::test]
async fn test_zone_lookup_failure() {
    let ctx = Context::new("zadig", "dev", Arc::new(PreviewEngine::new()));

    assert!(declare_topology(&ctx, &settings("cn-hangzhou")).await.is_err());
}

/// パスワードは計画にもログ用表現にも平文で出ない
#[tokio::test]
async fn test_password_never_exposed() {
    let engine = Arc::new(preview::engine(zones("cn-hangzhou")));
    let ctx = Context::new("zadig", "dev", engine.clone());

    let topology = declare_topology(&ctx, &settings("cn-hangzhou")).await.unwrap();
    ctx.finish().await.unwrap();

    let instance = &engine.records_of(INSTANCE_TYPE)[0];
    assert!(instance.secret_keys.contains("password"));
    assert!(!format!("{:?}", instance).contains("Passw0rd!"));
    assert_eq!(instance.redacted_props()["password"], json!(REDACTED));

    let plan = engine.plan();
    let plan_json = serde_json::to_string(&plan).unwrap();
    assert!(!plan_json.contains("Passw0rd!"));

    // プレビューは平文のパスワードを出力として返さない
    let outputs = topology.instance.resource().state().resolve().await.unwrap();
    assert!(!outputs.outputs.contains_key("password"));
}

#[tokio::test]
async fn test_run_preview_report() {
    let report = run_preview(&settings("cn-wulanchabu"), "zadig-infra", zones("cn-wulanchabu"))
        .await
        .unwrap();

    assert_eq!(report.summary.project, "zadig-infra");
    assert_eq!(report.summary.declared, 9);
    assert_eq!(report.plan.summary().create, 9);
    assert_eq!(report.outputs.vswitch_ids.len(), 2);
    assert_eq!(report.outputs.rule_ids.len(), 3);
    assert!(report.outputs.cluster_id.is_some());
    assert!(report.outputs.instance_id.starts_with("instance-"));
}
