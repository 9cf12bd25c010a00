//! Display formatting for CLI output
//!
//! SBIO pattern: Pure functions that format data for display

use crate::config::{ServiceRegistry, ValidationResult, ValidationSeverity};
use crate::plan::DeploymentPlan;
use crate::routing::{ListenerKind, RouteDecision, RoutingTable};

// ============================================================================
// Table formatting helpers
// ============================================================================

/// Format a simple table with headers and rows
pub fn format_table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return "No resources found.\n".to_string();
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let render_row = |cells: Vec<String>| -> String {
        let mut line = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| match widths.get(i) {
                Some(width) => format!("{:width$}", cell, width = *width),
                None => cell.clone(),
            })
            .collect::<Vec<_>>()
            .join("   ");
        line.truncate(line.trim_end().len());
        line.push('\n');
        line
    };

    let mut output = render_row(headers.iter().map(|h| h.to_uppercase()).collect());
    for row in rows {
        output.push_str(&render_row(row));
    }
    output
}

// ============================================================================
// Registry display
// ============================================================================

/// Format the registry as a table, in registry order
pub fn format_services(registry: &ServiceRegistry) -> String {
    let headers = &["NAME", "LISTENER", "PRIORITY", "PATH", "PORT", "CPU", "MEMORY", "REPLICAS"];
    let rows = registry
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                s.listener().to_string(),
                s.priority.to_string(),
                s.alb_path.clone(),
                s.container_port.to_string(),
                s.cpu_limit.to_string(),
                s.memory_limit.to_string(),
                s.desired_count.to_string(),
            ]
        })
        .collect();

    format_table(headers, rows)
}

// ============================================================================
// Routing display
// ============================================================================

/// Format the rules of both listeners in evaluation order
pub fn format_routes(table: &RoutingTable) -> String {
    let mut output = String::new();

    for listener in ListenerKind::ALL {
        output.push_str(&format!("Listener: {}\n", listener));
        let rows = table
            .rules_for(listener)
            .into_iter()
            .map(|r| {
                vec![
                    r.priority.to_string(),
                    r.path_pattern.clone(),
                    r.service.clone(),
                    r.health_check_path.clone(),
                ]
            })
            .collect();
        output.push_str(&format_table(&["PRIORITY", "PATH", "SERVICE", "HEALTH CHECK"], rows));

        let fallback = table.default_response();
        output.push_str(&format!(
            "default: fixed-response {} \"{}\"\n\n",
            fallback.status_code, fallback.message_body
        ));
    }

    output
}

/// Format the outcome of `resolve`
pub fn format_resolution(path: &str, decisions: &[(ListenerKind, RouteDecision)]) -> String {
    let mut output = String::new();
    for (listener, decision) in decisions {
        let target = match decision {
            RouteDecision::Forward { service, priority } => {
                format!("forward to {} (priority {})", service, priority)
            }
            RouteDecision::FixedResponse(response) => format!(
                "fixed-response {} \"{}\"",
                response.status_code, response.message_body
            ),
        };
        output.push_str(&format!("{:<8} {} -> {}\n", listener, path, target));
    }
    output
}

// ============================================================================
// Validation display
// ============================================================================

pub fn format_validation(result: &ValidationResult) -> String {
    let mut output = String::new();

    for msg in &result.messages {
        let level = match msg.severity {
            ValidationSeverity::Info => "info",
            ValidationSeverity::Warning => "warning",
            ValidationSeverity::Error => "error",
        };
        match &msg.service {
            Some(service) => output.push_str(&format!(
                "{}[{}] {}: {}\n",
                level, msg.code, service, msg.message
            )),
            None => output.push_str(&format!("{}[{}] {}\n", level, msg.code, msg.message)),
        }
        if let Some(ref suggestion) = msg.suggestion {
            output.push_str(&format!("  hint: {}\n", suggestion));
        }
    }

    if result.passed {
        output.push_str("Validation: PASSED\n");
    } else {
        output.push_str("Validation: FAILED\n");
    }
    output
}

// ============================================================================
// Plan display
// ============================================================================

/// Short summary printed after writing a plan to a file
pub fn format_plan_summary(plan: &DeploymentPlan, fingerprint: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Stack:        {}\n", plan.metadata.stack_name));
    output.push_str(&format!("Resources:    {}\n", plan.len()));
    for (kind, count) in plan.counts_by_kind() {
        output.push_str(&format!("  {:<16}{}\n", kind, count));
    }
    output.push_str(&format!("Fingerprint:  {}\n", fingerprint));
    output
}
