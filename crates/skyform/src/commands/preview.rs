use super::{home_dir, load_stack};
use colored::Colorize;
use serde_json::json;
use skyform::{PreviewReport, StackSettings, default_zones, run_preview};

pub async fn handle(stack: Option<String>, zones: Vec<String>, json_output: bool) -> anyhow::Result<()> {
    let loaded = load_stack(stack)?;
    let settings = StackSettings::from_config(&loaded.config, &loaded.name, home_dir()?)?;
    let project = loaded
        .config
        .project()
        .unwrap_or(settings.project.as_str())
        .to_string();

    let zones = if zones.is_empty() {
        default_zones(settings.region.as_deref())?
    } else {
        zones
    };

    if !json_output {
        println!("{}", "プレビューを作成中...".blue());
        println!("設定ファイル: {}", loaded.path.display().to_string().cyan());
        println!("スタック: {}", settings.stack.cyan());
        println!("ゾーン: {}", zones.join(", ").cyan());
    }

    let report = run_preview(&settings, &project, zones).await?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn report_json(report: &PreviewReport) -> serde_json::Value {
    let outputs = &report.outputs;
    json!({
        "project": report.summary.project,
        "stack": report.summary.stack,
        "plan": report.plan,
        "outputs": {
            "vpcId": outputs.vpc_id,
            "vswitchIds": outputs.vswitch_ids,
            "securityGroupId": outputs.security_group_id,
            "ruleIds": outputs.rule_ids,
            "clusterId": outputs.cluster_id,
            "instanceId": outputs.instance_id,
        },
    })
}

fn print_report(report: &PreviewReport) {
    println!();
    println!(
        "{}",
        format!("{:<10} {:<24} {:<40}", "ACTION", "TYPE", "NAME").bold()
    );
    println!("{}", "─".repeat(76).dimmed());

    for resource in &report.plan.resources {
        println!(
            "{:<10} {:<24} {:<40}",
            "+ create".green(),
            resource.kind,
            resource.name
        );
    }

    println!();
    println!("{}", report.plan.summary().to_string().bold());

    let outputs = &report.outputs;
    println!();
    println!("{}", "出力:".bold());
    println!("  vpcId:           {}", outputs.vpc_id.cyan());
    println!("  vswitchIds:      {}", outputs.vswitch_ids.join(", ").cyan());
    println!("  securityGroupId: {}", outputs.security_group_id.cyan());
    match &outputs.cluster_id {
        Some(id) => println!("  clusterId:       {}", id.cyan()),
        None => println!("  clusterId:       {}", "(このリージョンでは作成しません)".dimmed()),
    }
    println!("  instanceId:      {}", outputs.instance_id.cyan());

    println!();
    println!(
        "{}",
        format!("✓ {} 件のリソースを宣言しました", report.summary.declared).green()
    );
}
