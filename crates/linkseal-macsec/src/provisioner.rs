//! Idempotent MACsec security association provisioning.

use crate::{
    error::MacsecError,
    runner::{CommandOutput, CommandRunner},
};

/// Fixed two-hex-digit key identifier installed with every SA.
const KEY_ID: &str = "01";

/// MACsec port value used for the virtual interface and receive channel.
const MACSEC_PORT: &str = "1";

/// Interface naming and tool selection for provisioning.
#[derive(Debug, Clone)]
pub struct MacsecConfig {
    /// Physical interface the MACsec interface is bound to.
    pub phys_if: String,
    /// Name of the MACsec virtual interface to (re)create.
    pub macsec_if: String,
    /// Network configuration tool (iproute2 `ip`).
    pub tool: String,
}

impl MacsecConfig {
    /// Standard config over the `ip` tool.
    #[must_use]
    pub fn new(phys_if: impl Into<String>, macsec_if: impl Into<String>) -> Self {
        Self { phys_if: phys_if.into(), macsec_if: macsec_if.into(), tool: "ip".to_string() }
    }
}

/// Applies derived keys to the kernel as MACsec security associations.
///
/// Generic over the command runner so tests never mutate live kernel
/// state.
pub struct Provisioner<R: CommandRunner> {
    runner: R,
    config: MacsecConfig,
}

impl<R: CommandRunner> Provisioner<R> {
    /// Create a provisioner from a runner and its configuration.
    pub fn new(runner: R, config: MacsecConfig) -> Self {
        Self { runner, config }
    }

    /// Idempotently (re)create the MACsec virtual interface.
    ///
    /// Any pre-existing interface with the configured name is deleted
    /// first; deletion of a nonexistent interface is expected and
    /// swallowed. The fresh interface is created with encryption enabled
    /// and the fixed port value.
    ///
    /// # Errors
    ///
    /// [`MacsecError::PlatformUnsupported`] when the diagnostics indicate
    /// missing MACsec capability, [`MacsecError::ProvisioningFailed`]
    /// otherwise.
    pub async fn create_interface(&self) -> Result<(), MacsecError> {
        let delete =
            self.runner.run(&self.config.tool, &["link", "del", &self.config.macsec_if]).await?;
        if delete.success {
            tracing::info!(macsec_if = %self.config.macsec_if, "deleted stale MACsec interface");
        } else {
            // Expected on first run: there is nothing to delete.
            tracing::debug!(
                macsec_if = %self.config.macsec_if,
                detail = %delete.diagnostics(),
                "tolerant delete: no pre-existing interface"
            );
        }

        let create = self
            .runner
            .run(
                &self.config.tool,
                &[
                    "link",
                    "add",
                    "link",
                    &self.config.phys_if,
                    &self.config.macsec_if,
                    "type",
                    "macsec",
                    "port",
                    MACSEC_PORT,
                    "encrypt",
                    "on",
                ],
            )
            .await?;
        if !create.success {
            return Err(classify("create MACsec interface", &create));
        }

        tracing::info!(
            phys_if = %self.config.phys_if,
            macsec_if = %self.config.macsec_if,
            "MACsec interface created"
        );
        Ok(())
    }

    /// Install the transmit security association.
    ///
    /// The packet number is the starting value of the per-SA monotonic
    /// counter; it must never be reused for a given key.
    pub async fn add_transmit_sa(
        &self,
        sa_id: u8,
        key_hex: &str,
        packet_number: u64,
    ) -> Result<(), MacsecError> {
        let output = self
            .runner
            .run(
                &self.config.tool,
                &[
                    "macsec",
                    "add",
                    &self.config.macsec_if,
                    "tx",
                    "sa",
                    &sa_id.to_string(),
                    "pn",
                    &packet_number.to_string(),
                    "on",
                    "key",
                    KEY_ID,
                    key_hex,
                ],
            )
            .await?;
        if !output.success {
            return Err(classify("install transmit SA", &output));
        }

        tracing::info!(macsec_if = %self.config.macsec_if, sa_id, packet_number, "transmit SA installed");
        Ok(())
    }

    /// Install a receive security association scoped to a peer.
    pub async fn add_receive_sa(
        &self,
        peer_mac: &str,
        peer_port: u16,
        sa_id: u8,
        key_hex: &str,
        packet_number: u64,
    ) -> Result<(), MacsecError> {
        let output = self
            .runner
            .run(
                &self.config.tool,
                &[
                    "macsec",
                    "add",
                    &self.config.macsec_if,
                    "rx",
                    "port",
                    &peer_port.to_string(),
                    "address",
                    peer_mac,
                    "sa",
                    &sa_id.to_string(),
                    "pn",
                    &packet_number.to_string(),
                    "on",
                    "key",
                    KEY_ID,
                    key_hex,
                ],
            )
            .await?;
        if !output.success {
            return Err(classify("install receive SA", &output));
        }

        tracing::info!(
            macsec_if = %self.config.macsec_if,
            peer_mac,
            sa_id,
            packet_number,
            "receive SA installed"
        );
        Ok(())
    }

    /// Bring the physical and MACsec interfaces up.
    pub async fn activate(&self) -> Result<(), MacsecError> {
        for interface in [&self.config.phys_if, &self.config.macsec_if] {
            let output =
                self.runner.run(&self.config.tool, &["link", "set", interface, "up"]).await?;
            if !output.success {
                return Err(classify(&format!("bring '{interface}' up"), &output));
            }
        }

        tracing::info!(
            phys_if = %self.config.phys_if,
            macsec_if = %self.config.macsec_if,
            "interfaces are up"
        );
        Ok(())
    }
}

/// Translate a failed tool invocation into the error taxonomy.
///
/// Best-effort substring heuristic over the tool's diagnostic text. Kept
/// as the single classification point so it can be replaced by a
/// structured capability probe (e.g. checking for the kernel module
/// directly) without touching the call sites.
fn classify(action: &str, output: &CommandOutput) -> MacsecError {
    let detail = output.diagnostics();
    let lowered = detail.to_lowercase();

    // Kernel without the macsec module (or CONFIG_MACSEC disabled).
    if lowered.contains("not supported") || lowered.contains("unknown device type") {
        return MacsecError::PlatformUnsupported {
            detail,
            remediation: "load the macsec kernel module (modprobe macsec) or use a kernel built with CONFIG_MACSEC",
        };
    }

    // iproute2 build without the macsec subcommand; the tool reports this
    // through its usage/error text.
    if lowered.contains("unknown command") || lowered.contains("\"macsec\" is unknown") {
        return MacsecError::PlatformUnsupported {
            detail,
            remediation: "install an iproute2 build with macsec support (iproute2 >= 4.7)",
        };
    }

    MacsecError::ProvisioningFailed { action: action.to_string(), detail }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Scripted runner: records invocations, pops queued results.
    struct ScriptedRunner {
        calls: Mutex<Vec<String>>,
        results: Mutex<Vec<CommandOutput>>,
    }

    impl ScriptedRunner {
        fn new(results: Vec<CommandOutput>) -> Self {
            Self { calls: Mutex::new(Vec::new()), results: Mutex::new(results) }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, MacsecError> {
            self.calls.lock().unwrap().push(format!("{program} {}", args.join(" ")));
            let mut results = self.results.lock().unwrap();
            if results.is_empty() {
                return Ok(ok_output());
            }
            Ok(results.remove(0))
        }
    }

    fn ok_output() -> CommandOutput {
        CommandOutput { success: true, stdout: String::new(), stderr: String::new() }
    }

    fn failed(stderr: &str) -> CommandOutput {
        CommandOutput { success: false, stdout: String::new(), stderr: stderr.to_string() }
    }

    fn config() -> MacsecConfig {
        MacsecConfig::new("eth0", "macsec0")
    }

    const SAK_HEX: &str = "000102030405060708090a0b0c0d0e0f";

    #[tokio::test]
    async fn create_swallows_missing_interface_on_delete() {
        let runner =
            ScriptedRunner::new(vec![failed("Cannot find device \"macsec0\""), ok_output()]);
        let provisioner = Provisioner::new(runner, config());

        provisioner.create_interface().await.unwrap();

        let calls = provisioner.runner.calls();
        assert_eq!(calls[0], "ip link del macsec0");
        assert_eq!(calls[1], "ip link add link eth0 macsec0 type macsec port 1 encrypt on");
    }

    #[tokio::test]
    async fn create_twice_is_idempotent() {
        // First run: nothing to delete. Second run: delete succeeds.
        let runner = ScriptedRunner::new(vec![
            failed("Cannot find device \"macsec0\""),
            ok_output(),
            ok_output(),
            ok_output(),
        ]);
        let provisioner = Provisioner::new(runner, config());

        provisioner.create_interface().await.unwrap();
        provisioner.create_interface().await.unwrap();

        let adds = provisioner
            .runner
            .calls()
            .iter()
            .filter(|c| c.contains("link add"))
            .count();
        assert_eq!(adds, 2, "each round recreates exactly one interface");
    }

    #[tokio::test]
    async fn missing_kernel_support_is_classified() {
        let runner = ScriptedRunner::new(vec![
            ok_output(),
            failed("RTNETLINK answers: Operation not supported"),
        ]);
        let provisioner = Provisioner::new(runner, config());

        let err = provisioner.create_interface().await.unwrap_err();
        assert!(
            matches!(err, MacsecError::PlatformUnsupported { ref remediation, .. }
                if remediation.contains("macsec kernel module")),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn missing_tool_subcommand_is_classified() {
        let runner = ScriptedRunner::new(vec![failed(
            "Object \"macsec\" is unknown, try \"ip help\".",
        )]);
        let provisioner = Provisioner::new(runner, config());

        let err = provisioner.add_transmit_sa(0, SAK_HEX, 1).await.unwrap_err();
        assert!(
            matches!(err, MacsecError::PlatformUnsupported { ref remediation, .. }
                if remediation.contains("iproute2"))
        );
    }

    #[tokio::test]
    async fn other_failures_stay_provisioning_errors() {
        let runner = ScriptedRunner::new(vec![ok_output(), failed("RTNETLINK answers: File exists")]);
        let provisioner = Provisioner::new(runner, config());

        let err = provisioner.create_interface().await.unwrap_err();
        assert!(matches!(err, MacsecError::ProvisioningFailed { .. }));
    }

    #[tokio::test]
    async fn transmit_sa_command_shape() {
        let runner = ScriptedRunner::new(vec![]);
        let provisioner = Provisioner::new(runner, config());

        provisioner.add_transmit_sa(0, SAK_HEX, 1).await.unwrap();

        assert_eq!(
            provisioner.runner.calls()[0],
            format!("ip macsec add macsec0 tx sa 0 pn 1 on key 01 {SAK_HEX}")
        );
    }

    #[tokio::test]
    async fn receive_sa_command_shape() {
        let runner = ScriptedRunner::new(vec![]);
        let provisioner = Provisioner::new(runner, config());

        provisioner.add_receive_sa("aa:bb:cc:dd:ee:ff", 1, 0, SAK_HEX, 1).await.unwrap();

        assert_eq!(
            provisioner.runner.calls()[0],
            format!(
                "ip macsec add macsec0 rx port 1 address aa:bb:cc:dd:ee:ff sa 0 pn 1 on key 01 {SAK_HEX}"
            )
        );
    }

    #[tokio::test]
    async fn activate_brings_both_interfaces_up() {
        let runner = ScriptedRunner::new(vec![]);
        let provisioner = Provisioner::new(runner, config());

        provisioner.activate().await.unwrap();

        let calls = provisioner.runner.calls();
        assert_eq!(calls, vec!["ip link set eth0 up", "ip link set macsec0 up"]);
    }
}
