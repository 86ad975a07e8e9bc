//! System status report.

use crate::config::Config;
use crate::ui::{color_for_percentage, BLUE, RED, RESET};
use kaia_store::{AssistantStore, StoreStatus};
use std::time::Duration;
use sysinfo::{Disks, System};
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct CpuReport {
    pub name: String,
    pub speed: String,
    pub physical_cores: Option<usize>,
    pub logical_cores: usize,
}

#[derive(Debug, Clone)]
pub struct MemoryReport {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl MemoryReport {
    pub fn percent_used(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        let used = self.total_bytes - self.available_bytes;
        used as f64 / self.total_bytes as f64 * 100.0
    }
}

#[derive(Debug, Clone)]
pub struct DiskReport {
    pub label: String,
    pub mount_point: String,
    /// Total/used bytes, or the reason the mount could not be inspected.
    pub usage: Result<(u64, u64), String>,
}

#[derive(Debug, Clone)]
pub struct GpuReport {
    pub name: String,
    pub utilization_percent: f64,
    pub memory_total_mb: f64,
    pub memory_used_mb: f64,
}

#[derive(Debug)]
pub struct SystemStatus {
    pub timestamp: String,
    pub uptime: String,
    pub os: String,
    pub kernel: String,
    pub cpu: CpuReport,
    pub memory: MemoryReport,
    pub disks: Vec<DiskReport>,
    pub gpus: Vec<GpuReport>,
    pub model_daemon: &'static str,
    pub store: StoreStatus,
}

pub async fn collect(config: &Config, store: &AssistantStore) -> SystemStatus {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.refresh_cpu();

    let (cpu_name, cpu_speed) = read_cpuinfo();

    SystemStatus {
        timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        uptime: humanize_uptime(System::uptime()),
        os: format!(
            "{} {}",
            System::name().unwrap_or_else(|| "Linux".to_string()),
            System::cpu_arch().unwrap_or_default()
        )
        .trim()
        .to_string(),
        kernel: format!(
            "Linux {}",
            System::kernel_version().unwrap_or_else(|| "unknown".to_string())
        ),
        cpu: CpuReport {
            name: cpu_name,
            speed: cpu_speed,
            physical_cores: sys.physical_core_count(),
            logical_cores: sys.cpus().len(),
        },
        memory: MemoryReport {
            total_bytes: sys.total_memory(),
            available_bytes: sys.available_memory(),
        },
        disks: collect_disks(config),
        gpus: probe_nvidia().await,
        model_daemon: check_model_daemon(&config.ollama_url).await,
        store: store.status(),
    }
}

fn collect_disks(config: &Config) -> Vec<DiskReport> {
    let disks = Disks::new_with_refreshed_list();
    config
        .disk_mounts
        .iter()
        .map(|mount| {
            let found = disks
                .iter()
                .find(|d| d.mount_point().to_string_lossy() == mount.path);
            let usage = match found {
                Some(disk) => Ok((
                    disk.total_space(),
                    disk.total_space() - disk.available_space(),
                )),
                None => Err(format!("mount point {} not present", mount.path)),
            };
            DiskReport {
                label: mount.label.clone(),
                mount_point: mount.path.clone(),
                usage,
            }
        })
        .collect()
}

/// CPU model name and clock from /proc/cpuinfo; sysinfo's per-core data
/// does not carry the marketing name on all kernels.
fn read_cpuinfo() -> (String, String) {
    let mut name = "N/A".to_string();
    let mut speed = "N/A".to_string();
    if let Ok(content) = std::fs::read_to_string("/proc/cpuinfo") {
        for line in content.lines() {
            if name == "N/A" && line.starts_with("model name") {
                if let Some((_, value)) = line.split_once(':') {
                    name = value.trim().to_string();
                }
            }
            if speed == "N/A" && line.starts_with("cpu MHz") {
                if let Some((_, value)) = line.split_once(':') {
                    if let Ok(mhz) = value.trim().parse::<f64>() {
                        speed = if mhz >= 1000.0 {
                            format!("{:.2} GHz", mhz / 1000.0)
                        } else {
                            format!("{:.0} MHz", mhz)
                        };
                    }
                }
            }
            if name != "N/A" && speed != "N/A" {
                break;
            }
        }
    }
    (name, speed)
}

pub fn humanize_uptime(total_secs: u64) -> String {
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{} day{}", days, if days == 1 { "" } else { "s" }));
    }
    if hours > 0 {
        parts.push(format!("{} hr{}", hours, if hours == 1 { "" } else { "s" }));
    }
    if minutes > 0 {
        parts.push(format!(
            "{} min{}",
            minutes,
            if minutes == 1 { "" } else { "s" }
        ));
    }

    if parts.is_empty() {
        "Less than a minute".to_string()
    } else {
        parts.join(", ")
    }
}

/// Discrete GPU probe. A missing nvidia-smi binary is the common case
/// and yields an empty list, not an error.
async fn probe_nvidia() -> Vec<GpuReport> {
    let probe = Command::new("nvidia-smi")
        .args([
            "--query-gpu=name,utilization.gpu,memory.total,memory.used",
            "--format=csv,noheader,nounits",
        ])
        .output();

    let output = match tokio::time::timeout(Duration::from_secs(5), probe).await {
        Ok(Ok(output)) if output.status.success() => output,
        _ => return Vec::new(),
    };

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            if parts.len() != 4 {
                return None;
            }
            Some(GpuReport {
                name: parts[0].to_string(),
                utilization_percent: parts[1].parse().ok()?,
                memory_total_mb: parts[2].parse().ok()?,
                memory_used_mb: parts[3].parse().ok()?,
            })
        })
        .collect()
}

async fn check_model_daemon(base_url: &str) -> &'static str {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
    {
        Ok(client) => client,
        Err(_) => return "Error",
    };
    let url = format!("{}/api/tags", base_url.trim_end_matches('/'));
    match client.get(url).send().await {
        Ok(response) if response.status().is_success() => "Running",
        _ => "Not Running",
    }
}

fn gib(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0 * 1024.0)
}

pub fn render(status: &SystemStatus) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "• {}Date & Time:{} {}",
        BLUE, RESET, status.timestamp
    ));
    lines.push(format!("• {}Uptime:{} {}", BLUE, RESET, status.uptime));
    lines.push(format!("• {}OS:{} {}", BLUE, RESET, status.os));
    lines.push(format!("• {}Kernel:{} {}", BLUE, RESET, status.kernel));

    let cores = match status.cpu.physical_cores {
        Some(physical) => format!("{}c/{}t", physical, status.cpu.logical_cores),
        None => format!("{}t", status.cpu.logical_cores),
    };
    lines.push(format!(
        "• {}CPU:{} {} ({}) @ {}",
        BLUE, RESET, status.cpu.name, cores, status.cpu.speed
    ));

    let percent = status.memory.percent_used();
    lines.push(format!(
        "• {}Memory:{} {:.2} GB total, {:.2} GB available ({}{:.1}% used{})",
        BLUE,
        RESET,
        gib(status.memory.total_bytes),
        gib(status.memory.available_bytes),
        color_for_percentage(percent),
        percent,
        RESET
    ));

    for disk in &status.disks {
        match &disk.usage {
            Ok((total, used)) => {
                let percent = if *total == 0 {
                    0.0
                } else {
                    *used as f64 / *total as f64 * 100.0
                };
                lines.push(format!(
                    "• {}Disk Usage ('{}'):{} {:.2} GB total, {:.2} GB used ({}{:.1}% used{})",
                    BLUE,
                    RESET,
                    disk.label,
                    gib(*total),
                    gib(*used),
                    color_for_percentage(percent),
                    percent,
                    RESET
                ));
            }
            Err(reason) => {
                lines.push(format!(
                    "• {}Disk Usage ('{}'):{} Error - {}",
                    RED, disk.label, RESET, reason
                ));
            }
        }
    }

    if status.gpus.is_empty() {
        lines.push(format!("• {}GPU:{} N/A", BLUE, RESET));
    } else {
        for (i, gpu) in status.gpus.iter().enumerate() {
            lines.push(format!(
                "• {}GPU {}:{} {} [{:.0}% util, {:.0}/{:.0} MB]",
                BLUE,
                i + 1,
                RESET,
                gpu.name,
                gpu.utilization_percent,
                gpu.memory_used_mb,
                gpu.memory_total_mb
            ));
        }
    }

    lines.push(format!(
        "• {}Ollama Server:{} {}",
        BLUE, RESET, status.model_daemon
    ));

    if status.store.connected {
        lines.push(format!(
            "• {}Database:{} Connected (Tables: {})",
            BLUE,
            RESET,
            status.store.tables.join(", ")
        ));
    } else {
        lines.push(format!("• {}Database:{} Not Connected", BLUE, RESET));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_humanization() {
        assert_eq!(humanize_uptime(30), "Less than a minute");
        assert_eq!(humanize_uptime(60), "1 min");
        assert_eq!(humanize_uptime(3_600), "1 hr");
        assert_eq!(humanize_uptime(90_060), "1 day, 1 hr, 1 min");
        assert_eq!(humanize_uptime(2 * 86_400 + 2 * 3_600), "2 days, 2 hrs");
    }

    #[test]
    fn memory_percent_used() {
        let memory = MemoryReport {
            total_bytes: 100,
            available_bytes: 25,
        };
        assert!((memory.percent_used() - 75.0).abs() < f64::EPSILON);

        let empty = MemoryReport {
            total_bytes: 0,
            available_bytes: 0,
        };
        assert_eq!(empty.percent_used(), 0.0);
    }

    #[test]
    fn render_reports_missing_mounts_as_errors() {
        let status = SystemStatus {
            timestamp: "2026-01-01 00:00:00".to_string(),
            uptime: "1 hr".to_string(),
            os: "Arch Linux x86_64".to_string(),
            kernel: "Linux 6.12".to_string(),
            cpu: CpuReport {
                name: "AMD Ryzen".to_string(),
                speed: "4.20 GHz".to_string(),
                physical_cores: Some(8),
                logical_cores: 16,
            },
            memory: MemoryReport {
                total_bytes: 32 * 1024 * 1024 * 1024,
                available_bytes: 16 * 1024 * 1024 * 1024,
            },
            disks: vec![DiskReport {
                label: "Removable".to_string(),
                mount_point: "/run/media/usb".to_string(),
                usage: Err("mount point /run/media/usb not present".to_string()),
            }],
            gpus: Vec::new(),
            model_daemon: "Not Running",
            store: StoreStatus {
                connected: true,
                tables: vec!["facts".to_string()],
            },
        };

        let rendered = render(&status);
        assert!(rendered.contains("Removable"));
        assert!(rendered.contains("Error - mount point"));
        assert!(rendered.contains("GPU:"));
        assert!(rendered.contains("Not Running"));
    }
}
