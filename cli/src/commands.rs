//! One handler per marketplace action.
//!
//! # Design
//! Each handler is linear: build the request, optionally echo its payload,
//! send it once, classify the response, print. Commands differ in how they
//! treat a non-2xx status; each one names its [`HttpPolicy`].

use std::io::Write;

use serde_json::Value;
use tracing::info;
use vast_core::format::{format_float, round_to, to_inline_json, to_raw_json};
use vast_core::{
    interpret, parse_body, ClientError, CreateInstance, CreatedContract, HttpRequest, Instance, InstanceList, Label,
    MarketClient, Prepay, PrepayReceipt, ResponseOutcome, RunState, SshKey, StateChange,
};

use crate::dispatch::Invocation;
use crate::error::CliError;
use crate::transport::Transport;

/// What a command does with a non-2xx response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpPolicy {
    /// Fail with `CliError::Http`.
    Raise,
    /// Print the body and `failed with error {status}`, then succeed.
    Print,
}

pub struct Session<T, W> {
    client: MarketClient,
    transport: T,
    out: W,
    raw: bool,
    explain: bool,
}

impl<T: Transport, W: Write> Session<T, W> {
    pub fn new(client: MarketClient, transport: T, out: W, raw: bool, explain: bool) -> Self {
        Self {
            client,
            transport,
            out,
            raw,
            explain,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn dispatch(&mut self, invocation: Invocation) -> Result<(), CliError> {
        match invocation {
            Invocation::AttachSsh { instance_id, key } => self.attach_ssh(instance_id, &key),
            Invocation::DetachSsh { instance_id, key_id } => self.detach_ssh(instance_id, key_id),
            Invocation::CreateSshKey { key } => self.create_ssh_key(&key),
            Invocation::CreateInstance { ask_id, payload } => self.create_instance(ask_id, &payload),
            Invocation::DestroyInstance { id } => self.destroy_instance(id),
            Invocation::PrepayInstance { id, payload } => self.prepay_instance(id, &payload),
            Invocation::RebootInstance { id } => self.reboot_instance(id),
            Invocation::RecycleInstance { id } => self.recycle_instance(id),
            Invocation::ChangeState { id, change } => self.change_state(id, &change),
            Invocation::LabelInstance { id, label } => self.label_instance(id, &label),
            Invocation::ShowInstances => self.show_instances(),
        }
    }

    pub fn attach_ssh(&mut self, instance_id: u64, key: &SshKey) -> Result<(), CliError> {
        let req = self.client.build_attach_ssh(instance_id, key)?;
        let outcome = self.send(&req)?;
        self.settle(outcome, HttpPolicy::Raise, |_| {
            Ok(format!("ssh key attached to instance {instance_id}."))
        })
    }

    pub fn detach_ssh(&mut self, instance_id: u64, key_id: u64) -> Result<(), CliError> {
        let req = self.client.build_detach_ssh(instance_id, key_id)?;
        let outcome = self.send(&req)?;
        self.settle(outcome, HttpPolicy::Raise, |_| {
            Ok(format!("ssh key {key_id} detached from instance {instance_id}."))
        })
    }

    pub fn create_ssh_key(&mut self, key: &SshKey) -> Result<(), CliError> {
        let req = self.client.build_create_ssh_key(key)?;
        let outcome = self.send(&req)?;
        self.settle(outcome, HttpPolicy::Raise, |body| {
            Ok(format!("ssh-key created {}", to_inline_json(body)?))
        })
    }

    pub fn create_instance(&mut self, ask_id: u64, payload: &CreateInstance) -> Result<(), CliError> {
        let req = self.client.build_create_instance(ask_id, payload)?;
        let outcome = self.send(&req)?;
        self.settle(outcome, HttpPolicy::Raise, |body| {
            if let Ok(created) = parse_body::<CreatedContract>(body) {
                info!(ask_id, new_contract = created.new_contract, "instance created");
            }
            Ok(format!("Started. {}", to_inline_json(body)?))
        })
    }

    pub fn destroy_instance(&mut self, id: u64) -> Result<(), CliError> {
        let req = self.client.build_destroy_instance(id)?;
        let outcome = self.send(&req)?;
        self.settle(outcome, HttpPolicy::Raise, |_| Ok(format!("destroying instance {id}.")))
    }

    pub fn prepay_instance(&mut self, id: u64, payload: &Prepay) -> Result<(), CliError> {
        let req = self.client.build_prepay_instance(id, payload)?;
        let outcome = self.send(&req)?;
        let amount = payload.amount;
        self.settle(outcome, HttpPolicy::Raise, |body| {
            let receipt: PrepayReceipt = parse_body(body)?;
            let timescale = round_to(receipt.timescale, 3);
            let discount = 100.0 * round_to(receipt.discount_rate, 3);
            Ok(format!(
                "prepaid for {} months of instance {id} applying ${} credits for a discount of {}%",
                format_float(timescale),
                format_float(amount),
                format_float(discount),
            ))
        })
    }

    pub fn reboot_instance(&mut self, id: u64) -> Result<(), CliError> {
        let req = self.client.build_reboot_instance(id)?;
        let outcome = self.send(&req)?;
        self.settle(outcome, HttpPolicy::Print, |_| Ok(format!("Rebooting instance {id}.")))
    }

    pub fn recycle_instance(&mut self, id: u64) -> Result<(), CliError> {
        let req = self.client.build_recycle_instance(id)?;
        let outcome = self.send(&req)?;
        self.settle(outcome, HttpPolicy::Print, |_| Ok(format!("Recycling instance {id}.")))
    }

    pub fn change_state(&mut self, id: u64, change: &StateChange) -> Result<(), CliError> {
        let req = self.client.build_change_state(id, change)?;
        let outcome = self.send(&req)?;
        let verb = match change.state {
            RunState::Running => "starting",
            RunState::Stopped => "stopping",
        };
        self.settle(outcome, HttpPolicy::Print, |_| Ok(format!("{verb} instance {id}.")))
    }

    pub fn label_instance(&mut self, id: u64, label: &Label) -> Result<(), CliError> {
        let req = self.client.build_label_instance(id, label)?;
        let outcome = self.send(&req)?;
        self.settle(outcome, HttpPolicy::Raise, |_| {
            Ok(format!("label for {id} set to {}.", label.label))
        })
    }

    pub fn show_instances(&mut self) -> Result<(), CliError> {
        let req = self.client.build_show_instances();
        let outcome = self.send(&req)?;
        self.settle(outcome, HttpPolicy::Raise, |body| {
            let list: InstanceList = parse_body(body)?;
            Ok(instance_table(&list.instances))
        })
    }

    fn send(&mut self, req: &HttpRequest) -> Result<ResponseOutcome, CliError> {
        if self.explain {
            if let Some(body) = &req.body {
                let payload: Value = serde_json::from_str(body).map_err(|e| ClientError::Serialization(e.to_string()))?;
                writeln!(self.out, "request json: ")?;
                writeln!(self.out, "{}", to_inline_json(&payload)?)?;
            }
        }

        let response = self.transport.send(req)?;
        let outcome = interpret(&response)?;
        match &outcome {
            ResponseOutcome::HttpError { status, .. } => info!(url = %req.url, status, "http error"),
            ResponseOutcome::ApiError { message, .. } => info!(url = %req.url, msg = %message, "api error"),
            ResponseOutcome::ApiSuccess { .. } => info!(url = %req.url, "ok"),
        }
        Ok(outcome)
    }

    fn settle<F>(&mut self, outcome: ResponseOutcome, policy: HttpPolicy, summary: F) -> Result<(), CliError>
    where
        F: FnOnce(&Value) -> Result<String, CliError>,
    {
        match outcome {
            ResponseOutcome::HttpError { status, body } => match policy {
                HttpPolicy::Raise => Err(CliError::Http { status, body }),
                HttpPolicy::Print => {
                    writeln!(self.out, "{body}")?;
                    writeln!(self.out, "failed with error {status}")?;
                    Ok(())
                }
            },
            ResponseOutcome::ApiError { message, body } => {
                if self.raw {
                    writeln!(self.out, "{}", to_raw_json(&body)?)?;
                } else {
                    writeln!(self.out, "{message}")?;
                }
                Ok(())
            }
            ResponseOutcome::ApiSuccess { body } => {
                let line = if self.raw { to_raw_json(&body)? } else { summary(&body)? };
                writeln!(self.out, "{line}")?;
                Ok(())
            }
        }
    }
}

fn instance_table(instances: &[Instance]) -> String {
    const HEADER: [&str; 8] = ["ID", "Machine", "Status", "GPUs", "Model", "$/hr", "Image", "Label"];

    fn cell<T: ToString>(value: Option<T>) -> String {
        value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
    }

    let rows: Vec<[String; 8]> = instances
        .iter()
        .map(|i| {
            [
                i.id.to_string(),
                cell(i.machine_id),
                cell(i.actual_status.as_deref()),
                cell(i.num_gpus),
                cell(i.gpu_name.as_deref()),
                cell(i.dph_total.map(|d| format!("{d:.4}"))),
                cell(i.image_uuid.as_deref()),
                cell(i.label.as_deref()),
            ]
        })
        .collect();

    let mut widths = HEADER.map(str::len);
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let mut lines = vec![render_row(HEADER.iter().copied(), &widths)];
    for row in &rows {
        lines.push(render_row(row.iter().map(String::as_str), &widths));
    }
    lines.join("\n")
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(value, &width)| format!("{value:<width$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}
