use log::debug;
use serde::Deserialize;

use crate::backend::{Backend, monitor_uuid};
use crate::types::LiveMonitor;

pub struct HyprctlBackend {
    executable: String,
}

impl HyprctlBackend {
    pub fn new(executable: String) -> Self {
        Self { executable }
    }
}

impl Backend for HyprctlBackend {
    fn get_live_monitors(&self) -> anyhow::Result<Vec<LiveMonitor>> {
        let mut cmd = std::process::Command::new(&self.executable);
        cmd.arg("-j").arg("monitors").arg("all");

        debug!("Executing {:?}", cmd);
        let output = cmd.output()?;
        if !output.status.success() {
            return Err(anyhow::anyhow!("hyprctl failed"));
        }
        parse_monitors(&output.stdout)
    }
}

fn parse_monitors(json: &[u8]) -> anyhow::Result<Vec<LiveMonitor>> {
    let heads: Vec<HyprctlHead> = serde_json::from_slice(json)?;
    Ok(heads.into_iter().map(HyprctlHead::make_live_monitor).collect())
}

#[derive(Debug, Deserialize)]
struct HyprctlHead {
    name: String,
    make: String,
    model: String,
    serial: String,
    disabled: bool,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    #[serde(rename = "refreshRate")]
    refresh_rate: f64,
    transform: i32,
}

impl HyprctlHead {
    fn make_live_monitor(self) -> LiveMonitor {
        LiveMonitor {
            uuid: monitor_uuid(&self.make, &self.model, &self.serial, &self.name),
            name: self.name,
            make: self.make,
            model: self.model,
            serial: self.serial,
            enabled: !self.disabled,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            refresh_rate: self.refresh_rate,
            transform: self.transform,
        }
    }
}
