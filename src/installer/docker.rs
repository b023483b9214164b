//! Docker: Docker Desktop on macOS, Docker Engine from the docker-ce apt
//! repository on Ubuntu/Debian.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use super::{
    InstallContext, InstallOptions, InstallResult, InstallerStrategy, StatusReport,
    UninstallOptions, UninstallResult,
};
use crate::error::Result;
use crate::platform::{Architecture, OsType};
use crate::shell::CommandSpec;

/// Where to send users when the automatic download fails.
pub const DOCKER_DESKTOP_URL: &str = "https://www.docker.com/products/docker-desktop/";

const DMG_URL_ARM64: &str = "https://desktop.docker.com/mac/main/arm64/Docker.dmg";
const DMG_URL_AMD64: &str = "https://desktop.docker.com/mac/main/amd64/Docker.dmg";

const KEYRING_DIR: &str = "/etc/apt/keyrings";
const KEYRING_PATH: &str = "/etc/apt/keyrings/docker.asc";
const SOURCES_LIST: &str = "/etc/apt/sources.list.d/docker.list";

/// Distribution packages that conflict with docker-ce.
const CONFLICTING_PACKAGES: &[&str] = &[
    "docker.io",
    "docker-doc",
    "docker-compose",
    "docker-compose-v2",
    "podman-docker",
    "containerd",
    "runc",
];

const ENGINE_PACKAGES: &[&str] = &[
    "docker-ce",
    "docker-ce-cli",
    "containerd.io",
    "docker-buildx-plugin",
];

const COMPOSE_PACKAGE: &str = "docker-compose-plugin";

/// Readiness polls after launching Docker Desktop.
const START_ATTEMPTS: usize = 30;

fn verify_docker(ctx: &mut InstallContext<'_>) -> bool {
    ctx.run(CommandSpec::new(["docker", "--version"]).timeout(Duration::from_secs(10)))
        .success
}

fn daemon_running(ctx: &mut InstallContext<'_>, timeout: Duration) -> bool {
    ctx.run(CommandSpec::new(["docker", "info"]).timeout(timeout))
        .success
}

/// Prune images and volumes before the engine goes away.
fn prune(ctx: &mut InstallContext<'_>, options: &UninstallOptions, result: &mut UninstallResult) {
    if !ctx.command_exists("docker") {
        return;
    }
    if options.remove_images {
        ctx.info("Removing Docker images...");
        let outcome = ctx.run(
            CommandSpec::new(["docker", "image", "prune", "-a", "-f"])
                .timeout(Duration::from_secs(300)),
        );
        if !outcome.success {
            result.add_warning(format!("Could not remove Docker images: {}", outcome.error_text()));
        }
    }
    if options.remove_volumes {
        ctx.info("Removing Docker volumes...");
        let outcome = ctx.run(
            CommandSpec::new(["docker", "volume", "prune", "-a", "-f"])
                .timeout(Duration::from_secs(300)),
        );
        if !outcome.success {
            result.add_warning(format!("Could not remove Docker volumes: {}", outcome.error_text()));
        }
    }
}

/// Docker Desktop from the official disk image.
#[derive(Debug, Clone)]
pub struct DockerMacOs {
    mount_point: PathBuf,
    applications: PathBuf,
}

impl Default for DockerMacOs {
    fn default() -> Self {
        Self {
            mount_point: PathBuf::from("/Volumes/Docker"),
            applications: PathBuf::from("/Applications"),
        }
    }
}

impl DockerMacOs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use other locations for the mounted image and the Applications folder.
    pub fn with_paths(mount_point: impl Into<PathBuf>, applications: impl Into<PathBuf>) -> Self {
        Self {
            mount_point: mount_point.into(),
            applications: applications.into(),
        }
    }

    fn dmg_url(arch: Architecture) -> &'static str {
        match arch {
            Architecture::Arm64 => DMG_URL_ARM64,
            _ => DMG_URL_AMD64,
        }
    }

    fn app_path(&self) -> PathBuf {
        self.applications.join("Docker.app")
    }

    fn detach(&self, ctx: &mut InstallContext<'_>) {
        let mount = self.mount_point.display().to_string();
        ctx.run(
            CommandSpec::new(["hdiutil", "detach", mount.as_str(), "-quiet"])
                .timeout(Duration::from_secs(30)),
        );
    }

    /// Copy Docker.app out of the mounted image.
    fn copy_app(&self, ctx: &mut InstallContext<'_>) -> InstallResult {
        let source = self.mount_point.join("Docker.app");
        if !ctx.dry_run && !ctx.exists(&source) {
            return InstallResult::failure("Docker.app not found in the disk image");
        }

        let dest = self.app_path();
        if ctx.exists(&dest) {
            ctx.info("Removing the previous version...");
            if let Err(e) = ctx.remove_all(&dest) {
                return InstallResult::failure("Could not remove the previous Docker.app")
                    .with_error(e.to_string());
            }
        }

        let outcome = ctx.run(
            CommandSpec::new([
                "cp".to_string(),
                "-R".to_string(),
                source.display().to_string(),
                dest.display().to_string(),
            ])
            .description("Copying Docker.app")
            .timeout(Duration::from_secs(120)),
        );
        if !outcome.success {
            return InstallResult::failure("Failed to copy Docker.app")
                .with_error(outcome.error_text());
        }
        ctx.success(&format!("Docker Desktop installed in {}", self.applications.display()));
        InstallResult::success("Docker Desktop installed")
    }

    /// Mount the image, copy the app, always detach.
    fn install_from_dmg(&self, ctx: &mut InstallContext<'_>, dmg: &std::path::Path) -> InstallResult {
        ctx.info("Mounting the disk image...");
        if ctx.exists(&self.mount_point) {
            self.detach(ctx);
        }

        let outcome = ctx.run(
            CommandSpec::new([
                "hdiutil".to_string(),
                "attach".to_string(),
                dmg.display().to_string(),
                "-nobrowse".to_string(),
                "-quiet".to_string(),
            ])
            .description("Mounting Docker.dmg")
            .timeout(Duration::from_secs(60)),
        );
        if !outcome.success {
            return InstallResult::failure("Failed to mount the disk image")
                .with_error(outcome.error_text());
        }

        let result = self.copy_app(ctx);
        ctx.info("Unmounting the disk image...");
        self.detach(ctx);
        result
    }

    fn start(&self, ctx: &mut InstallContext<'_>, result: &mut InstallResult) {
        if daemon_running(ctx, Duration::from_secs(10)) {
            ctx.success("Docker is already running");
            return;
        }

        ctx.info("Starting Docker Desktop...");
        let outcome = ctx.run(CommandSpec::new(["open", "-a", "Docker"]).description("Starting Docker Desktop"));
        if !outcome.success {
            result.add_warning("Could not start Docker Desktop; start it from Applications");
            return;
        }

        ctx.info("Waiting for Docker to start...");
        for attempt in 1..=START_ATTEMPTS {
            if ctx.is_cancelled() {
                break;
            }
            ctx.pause();
            if daemon_running(ctx, Duration::from_secs(5)) {
                ctx.clear_progress();
                ctx.success("Docker is ready");
                return;
            }
            ctx.progress(&format!("Waiting... ({}/{})", attempt, START_ATTEMPTS));
        }
        ctx.clear_progress();
        result.add_warning(
            "Docker Desktop is still starting; wait until the menu bar icon shows 'Running'",
        );
    }
}

impl InstallerStrategy for DockerMacOs {
    fn check_status(&self, ctx: &mut InstallContext<'_>) -> Result<StatusReport> {
        if ctx.command_exists("docker") {
            let running = ctx
                .run(
                    CommandSpec::new(["docker", "info"])
                        .timeout(Duration::from_secs(10))
                        .skip_dry_run(),
                )
                .success;
            if running {
                return Ok(StatusReport::installed(ctx.version("docker")));
            }
        }

        let candidates = [self.app_path(), ctx.home("Applications/Docker.app")];
        if candidates.iter().any(|p| ctx.exists(p)) {
            return Ok(StatusReport::installed("(Docker Desktop, daemon not running)"));
        }
        Ok(StatusReport::not_installed())
    }

    fn install(&self, ctx: &mut InstallContext<'_>, _options: &InstallOptions) -> Result<InstallResult> {
        let arch = ctx.platform.arch;
        let url = Self::dmg_url(arch);
        let arch_name = if arch == Architecture::Arm64 {
            "Apple Silicon"
        } else {
            "Intel"
        };
        ctx.section("Docker Desktop");
        ctx.info(&format!("Downloading Docker Desktop for {}...", arch_name));

        // A failure here means no usable scratch space at all.
        let work_dir = ctx.temp_dir.join("docker-install");
        ctx.create_dir_all(&work_dir)?;
        let dmg = work_dir.join("Docker.dmg");

        if let Err(e) = ctx.download(url, &dmg) {
            debug!(error = %e, "Docker Desktop download failed");
            let _ = ctx.remove_all(&work_dir);
            return Ok(InstallResult::failure("Failed to download Docker Desktop")
                .with_error(e.to_string())
                .with_error(format!("Download it manually from {}", DOCKER_DESKTOP_URL)));
        }
        ctx.success("Download complete");

        let mut result = self.install_from_dmg(ctx, &dmg);
        if let Err(e) = ctx.remove_all(&work_dir) {
            debug!(error = %e, "Could not clean up the Docker download directory");
        }
        if !result.success {
            return Ok(result);
        }

        self.start(ctx, &mut result);

        ctx.section("Additional information");
        ctx.info("Docker Desktop bundles the engine, CLI, Compose and BuildKit.");
        ctx.info("Enable Kubernetes in Docker Desktop > Settings > Kubernetes.");

        result.message = "Docker Desktop installed successfully".to_string();
        Ok(result.with_path(self.app_path()))
    }

    fn verify(&self, ctx: &mut InstallContext<'_>) -> bool {
        verify_docker(ctx)
    }

    fn uninstall(
        &self,
        ctx: &mut InstallContext<'_>,
        options: &UninstallOptions,
    ) -> Result<UninstallResult> {
        ctx.section("Uninstalling Docker Desktop");
        let mut result = UninstallResult::success("Docker Desktop uninstalled successfully");
        prune(ctx, options, &mut result);

        ctx.info("Quitting Docker Desktop...");
        ctx.run(CommandSpec::new(["osascript", "-e", "quit app \"Docker\""]));
        ctx.pause();

        let app = self.app_path();
        if ctx.exists(&app) {
            if let Err(e) = ctx.remove_all(&app) {
                return Ok(UninstallResult::failure("Could not remove Docker.app")
                    .with_error(e.to_string())
                    .with_warnings(result.warnings));
            }
            ctx.success("Docker.app removed");
        }

        if options.remove_data {
            ctx.info("Removing Docker data...");
            let data: Vec<PathBuf> = [
                ".docker",
                "Library/Group Containers/group.com.docker",
                "Library/Containers/com.docker.docker",
                "Library/Application Support/Docker Desktop",
                "Library/Preferences/com.docker.docker.plist",
                "Library/Saved Application State/com.electron.docker-frontend.savedState",
                "Library/Logs/Docker Desktop",
            ]
            .iter()
            .map(|rel| ctx.home(rel))
            .filter(|p| ctx.exists(p))
            .collect();
            ctx.remove_paths(&data, &mut result.warnings);
        }

        Ok(result)
    }
}

/// Docker Engine from download.docker.com on Ubuntu and Debian.
#[derive(Debug, Clone, Default)]
pub struct DockerDebian;

impl DockerDebian {
    pub fn new() -> Self {
        Self
    }

    fn distro(os: OsType) -> (&'static str, &'static str) {
        match os {
            OsType::Debian => ("debian", "bookworm"),
            _ => ("ubuntu", "jammy"),
        }
    }

    fn codename(ctx: &mut InstallContext<'_>, fallback: &str) -> String {
        let probes = [
            CommandSpec::new(["lsb_release", "-cs"]),
            CommandSpec::bash(". /etc/os-release && echo $VERSION_CODENAME"),
        ];
        for spec in probes {
            let outcome = ctx.run(spec.timeout(Duration::from_secs(10)).skip_dry_run());
            if outcome.success && !outcome.stdout.is_empty() {
                return outcome.stdout;
            }
        }
        fallback.to_string()
    }

    fn apt_arch(ctx: &mut InstallContext<'_>) -> String {
        let outcome = ctx.run(
            CommandSpec::new(["dpkg", "--print-architecture"])
                .timeout(Duration::from_secs(10))
                .skip_dry_run(),
        );
        if outcome.success && !outcome.stdout.is_empty() {
            return outcome.stdout;
        }
        match ctx.platform.arch {
            Architecture::Arm64 => "arm64".to_string(),
            _ => "amd64".to_string(),
        }
    }

    fn apt(ctx: &mut InstallContext<'_>, args: &[&str], description: &str, timeout: Duration) -> crate::shell::CommandOutcome {
        let argv = ["apt-get"].into_iter().chain(args.iter().copied());
        ctx.run(
            CommandSpec::new(argv)
                .elevated()
                .description(description)
                .timeout(timeout),
        )
    }

    /// Key and sources entry for the docker-ce repository.
    fn add_repository(&self, ctx: &mut InstallContext<'_>) -> std::result::Result<(), InstallResult> {
        ctx.section("Configuring the Docker repository");
        let (distro, default_codename) = Self::distro(ctx.platform.os);

        ctx.info("Adding the Docker GPG key...");
        ctx.run(CommandSpec::new(["mkdir", "-p", KEYRING_DIR]).elevated());

        let key_url = format!("https://download.docker.com/linux/{}/gpg", distro);
        let staged = ctx.temp_dir.join("docker.asc");
        if let Err(e) = ctx.download(&key_url, &staged) {
            return Err(InstallResult::failure("Failed to download Docker GPG key")
                .with_error(e.to_string())
                .with_error("See https://docs.docker.com/engine/install/ for manual steps"));
        }
        let staged = staged.display().to_string();
        let moved = ctx.run(CommandSpec::new(["mv", staged.as_str(), KEYRING_PATH]).elevated());
        if !moved.success {
            return Err(InstallResult::failure("Failed to install Docker GPG key")
                .with_error(moved.error_text()));
        }
        ctx.run(CommandSpec::new(["chmod", "a+r", KEYRING_PATH]).elevated());
        ctx.success("GPG key added");

        ctx.info("Configuring the APT source...");
        let codename = Self::codename(ctx, default_codename);
        let arch = Self::apt_arch(ctx);
        let line = format!(
            "deb [arch={} signed-by={}] https://download.docker.com/linux/{} {} stable",
            arch, KEYRING_PATH, distro, codename
        );
        let written = ctx.run(
            CommandSpec::bash(&format!("echo '{}' > {}", line, SOURCES_LIST)).elevated(),
        );
        if !written.success {
            return Err(InstallResult::failure("Failed to configure the Docker repository")
                .with_error(written.error_text()));
        }
        ctx.success("Repository configured");
        Ok(())
    }
}

impl InstallerStrategy for DockerDebian {
    fn check_status(&self, ctx: &mut InstallContext<'_>) -> Result<StatusReport> {
        if ctx.command_exists("docker") {
            return Ok(StatusReport::installed(ctx.version("docker")));
        }
        Ok(StatusReport::not_installed())
    }

    fn install(&self, ctx: &mut InstallContext<'_>, options: &InstallOptions) -> Result<InstallResult> {
        let docker = &options.apps.docker;
        let mut warnings = Vec::new();

        ctx.section("Removing conflicting packages");
        let mut remove = vec!["remove", "-y"];
        remove.extend_from_slice(CONFLICTING_PACKAGES);
        Self::apt(ctx, &remove, "Removing old packages", Duration::from_secs(300));

        ctx.section("Installing prerequisites");
        let prereqs = Self::apt(
            ctx,
            &["install", "-y", "ca-certificates", "curl", "gnupg"],
            "Installing prerequisites",
            Duration::from_secs(300),
        );
        if !prereqs.success {
            return Ok(InstallResult::failure("Failed to install prerequisites")
                .with_error(prereqs.error_text()));
        }
        ctx.success("Prerequisites installed");

        if let Err(failure) = self.add_repository(ctx) {
            return Ok(failure);
        }

        ctx.section("Updating package index");
        let update = Self::apt(ctx, &["update"], "Updating the package index", Duration::from_secs(300));
        if !update.success {
            warnings.push("Failed to update the package index".to_string());
        }

        ctx.section("Installing Docker");
        let mut packages = vec!["install", "-y"];
        packages.extend_from_slice(ENGINE_PACKAGES);
        if docker.install_compose {
            packages.push(COMPOSE_PACKAGE);
        }
        let installed = Self::apt(ctx, &packages, "Installing Docker Engine", Duration::from_secs(600));
        if !installed.success {
            return Ok(InstallResult::failure("Failed to install Docker")
                .with_error(installed.error_text())
                .with_warnings(warnings));
        }
        ctx.success("Docker installed");

        if docker.add_user_to_docker_group {
            let username = ctx.platform.username.clone();
            if !username.is_empty() && username != "root" {
                ctx.section("Configuring the docker group");
                let added = ctx.run(
                    CommandSpec::new(["usermod", "-aG", "docker", username.as_str()]).elevated(),
                );
                if added.success {
                    ctx.success(&format!("User '{}' added to the docker group", username));
                    warnings.push("Log out and back in to use Docker without sudo".to_string());
                } else {
                    warnings.push(format!(
                        "Could not add '{}' to the docker group; run: sudo usermod -aG docker {}",
                        username, username
                    ));
                }
            }
        }

        if docker.start_on_boot {
            ctx.section("Configuring the service");
            let enabled = ctx.run(CommandSpec::new(["systemctl", "enable", "docker"]).elevated());
            let started = ctx.run(
                CommandSpec::new(["systemctl", "start", "docker"]).non_interactive_elevation(),
            );
            if enabled.success && started.success {
                ctx.success("Docker service started and enabled at boot");
            } else {
                warnings.push("Could not enable the Docker service; run: sudo systemctl enable --now docker".to_string());
            }
        }

        let mut result = InstallResult::success("Docker installed successfully").with_warnings(warnings);
        if ctx.command_exists("docker") {
            result.version = ctx.version("docker");
        }
        Ok(result)
    }

    fn verify(&self, ctx: &mut InstallContext<'_>) -> bool {
        verify_docker(ctx)
    }

    fn uninstall(
        &self,
        ctx: &mut InstallContext<'_>,
        options: &UninstallOptions,
    ) -> Result<UninstallResult> {
        ctx.section("Uninstalling Docker");
        let mut result = UninstallResult::success("Docker uninstalled successfully");
        prune(ctx, options, &mut result);

        ctx.info("Stopping the Docker service...");
        ctx.run(CommandSpec::new(["systemctl", "stop", "docker"]).elevated());
        ctx.run(CommandSpec::new(["systemctl", "disable", "docker"]).elevated());

        ctx.info("Removing Docker packages...");
        let mut purge = vec!["purge", "-y"];
        purge.extend_from_slice(ENGINE_PACKAGES);
        purge.push(COMPOSE_PACKAGE);
        let purged = Self::apt(ctx, &purge, "Removing Docker packages", Duration::from_secs(600));
        if !purged.success {
            return Ok(UninstallResult::failure("Failed to remove Docker packages")
                .with_error(purged.error_text())
                .with_warnings(result.warnings));
        }
        ctx.success("Docker packages removed");

        if options.remove_data {
            ctx.info("Removing Docker data...");
            for dir in ["/var/lib/docker", "/var/lib/containerd", "/etc/docker"] {
                let outcome = ctx.run(CommandSpec::new(["rm", "-rf", dir]).elevated());
                if !outcome.success {
                    result.add_warning(format!("Could not remove {}", dir));
                }
            }
            let user_dir = ctx.home(".docker");
            ctx.remove_paths(&[user_dir], &mut result.warnings);
        }

        ctx.run(CommandSpec::new(["rm", "-f", SOURCES_LIST]).elevated());
        ctx.run(CommandSpec::new(["rm", "-f", KEYRING_PATH]).elevated());

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::MockDownloader;
    use crate::installer::test_support::Harness;
    use crate::shell::{CommandOutcome, MockRunner};

    fn ubuntu_runner() -> MockRunner {
        MockRunner::new()
            .on("lsb_release -cs", CommandOutcome::success("noble"))
            .on("dpkg --print-architecture", CommandOutcome::success("amd64"))
            .on("docker --version", CommandOutcome::success("Docker version 27.1.1, build 6312585"))
    }

    #[test]
    fn debian_install_runs_steps_in_order() {
        let mut h = Harness::ubuntu(ubuntu_runner());
        let result = DockerDebian.install(&mut h.ctx(), &InstallOptions::default()).unwrap();

        assert!(result.success, "{:?}", result);
        assert_eq!(result.version, "27.1.1");
        let key = h.runner.position("mv ").unwrap();
        let source = h.runner.position("bash -c echo 'deb [arch=amd64").unwrap();
        let update = h.runner.position("apt-get update").unwrap();
        let install = h.runner.position("apt-get install -y docker-ce").unwrap();
        assert!(key < source && source < update && update < install);
        assert!(h.runner.ran("usermod -aG docker dev"));
        assert!(h.runner.ran("systemctl enable docker"));
        assert_eq!(
            h.downloads.urls(),
            vec!["https://download.docker.com/linux/ubuntu/gpg"]
        );
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("Log out and back in")));
    }

    #[test]
    fn debian_repository_line_uses_codename() {
        let mut h = Harness::ubuntu(ubuntu_runner());
        DockerDebian.install(&mut h.ctx(), &InstallOptions::default()).unwrap();
        let line = h
            .runner
            .commands()
            .into_iter()
            .find(|c| c.starts_with("bash -c echo"))
            .unwrap();
        assert!(line.contains("https://download.docker.com/linux/ubuntu noble stable"));
        assert!(line.ends_with("> /etc/apt/sources.list.d/docker.list"));
    }

    #[test]
    fn compose_and_group_are_optional() {
        let mut h = Harness::ubuntu(ubuntu_runner());
        let mut options = InstallOptions::default();
        options.apps.docker.install_compose = false;
        options.apps.docker.add_user_to_docker_group = false;
        options.apps.docker.start_on_boot = false;
        DockerDebian.install(&mut h.ctx(), &options).unwrap();

        assert!(!h.runner.commands().iter().any(|c| c.contains(COMPOSE_PACKAGE)));
        assert!(!h.runner.ran("usermod"));
        assert!(!h.runner.ran("systemctl"));
    }

    #[test]
    fn gpg_download_failure_is_specific() {
        let mut h = Harness::ubuntu(ubuntu_runner()).downloads(
            MockDownloader::new().fail_transport("https://download.docker.com", "connection reset"),
        );
        let result = DockerDebian.install(&mut h.ctx(), &InstallOptions::default()).unwrap();

        assert!(!result.success);
        assert_eq!(result.message, "Failed to download Docker GPG key");
        assert!(result.errors.iter().any(|e| e.contains("connection reset")));
        assert!(!h.runner.ran("apt-get install -y docker-ce"));
    }

    #[test]
    fn package_failure_carries_stderr() {
        let runner = ubuntu_runner().fail_on("apt-get install -y docker-ce", "E: Unable to locate package docker-ce");
        let mut h = Harness::ubuntu(runner);
        let result = DockerDebian.install(&mut h.ctx(), &InstallOptions::default()).unwrap();

        assert!(!result.success);
        assert_eq!(result.errors, vec!["E: Unable to locate package docker-ce"]);
        assert!(!h.runner.ran("usermod"));
    }

    #[test]
    fn root_is_not_added_to_group() {
        let mut h = Harness::ubuntu(ubuntu_runner());
        h.platform = h.platform.clone().with_username("root");
        DockerDebian.install(&mut h.ctx(), &InstallOptions::default()).unwrap();
        assert!(!h.runner.ran("usermod"));
    }

    #[test]
    fn install_leaves_verification_to_the_caller() {
        let runner = ubuntu_runner().fail_on("docker --version", "not found");
        let mut h = Harness::ubuntu(runner);
        let result = DockerDebian.install(&mut h.ctx(), &InstallOptions::default()).unwrap();
        assert!(result.success);
        assert!(!result.warnings.iter().any(|w| w.contains("verification")));
        let version_checks = h
            .runner
            .commands()
            .iter()
            .filter(|c| c.starts_with("docker --version"))
            .count();
        assert!(version_checks <= 1);
    }

    #[test]
    fn dry_run_install_only_simulates() {
        let mut h = Harness::ubuntu(ubuntu_runner()).dry_run();
        let result = DockerDebian.install(&mut h.ctx(), &InstallOptions::default()).unwrap();

        assert!(result.success);
        assert!(h.downloads.urls().is_empty());
        assert!(h
            .runner
            .commands()
            .iter()
            .all(|c| c.starts_with("lsb_release") || c.starts_with("dpkg") || c.starts_with("docker --version")));
        assert!(h
            .runner
            .simulated()
            .iter()
            .any(|c| c.starts_with("sudo -n apt-get install -y docker-ce")));
        assert!(h.ui.has_message("[DRY RUN] download https://download.docker.com/linux/ubuntu/gpg"));
    }

    #[test]
    fn debian_uses_debian_repository() {
        let mut h = Harness::new(OsType::Debian, ubuntu_runner());
        DockerDebian.install(&mut h.ctx(), &InstallOptions::default()).unwrap();
        assert_eq!(
            h.downloads.urls(),
            vec!["https://download.docker.com/linux/debian/gpg"]
        );
    }

    #[test]
    fn debian_uninstall_keeps_data_by_default() {
        let mut h = Harness::ubuntu(MockRunner::new().with_tool("docker"));
        let docker_dir = h.touch(".docker/config.json");
        let result = DockerDebian
            .uninstall(&mut h.ctx(), &UninstallOptions::default())
            .unwrap();

        assert!(result.success);
        assert!(h.runner.ran("apt-get purge -y docker-ce"));
        assert!(!h.runner.ran("rm -rf"));
        assert!(!h.runner.ran("docker image prune"));
        assert!(docker_dir.exists());
    }

    #[test]
    fn debian_uninstall_prunes_and_removes_data_on_request() {
        let mut h = Harness::ubuntu(MockRunner::new().with_tool("docker"));
        let docker_dir = h.touch(".docker/config.json");
        let options = UninstallOptions {
            remove_data: true,
            remove_images: true,
            remove_volumes: true,
            ..Default::default()
        };
        let result = DockerDebian.uninstall(&mut h.ctx(), &options).unwrap();

        assert!(result.success);
        assert!(h.runner.position("docker image prune").unwrap() < h.runner.position("apt-get purge").unwrap());
        assert!(h.runner.ran("docker volume prune"));
        assert!(h.runner.ran("rm -rf /var/lib/docker"));
        assert!(!docker_dir.exists());
    }

    #[test]
    fn mac_status_falls_back_to_app_bundle() {
        let mut h = Harness::mac(MockRunner::new());
        let apps = h.home("Applications");
        std::fs::create_dir_all(apps.join("Docker.app")).unwrap();
        let strategy = DockerMacOs::with_paths(h.home("Volumes/Docker"), &apps);

        let first = strategy.check_status(&mut h.ctx()).unwrap();
        let second = strategy.check_status(&mut h.ctx()).unwrap();
        assert!(first.is_installed());
        assert_eq!(first, second);
    }

    #[test]
    fn mac_status_uses_running_daemon() {
        let runner = MockRunner::new()
            .with_tool("docker")
            .on("docker --version", CommandOutcome::success("Docker version 27.1.1, build 6312585"));
        let mut h = Harness::mac(runner);
        let strategy = DockerMacOs::with_paths(h.home("Volumes/Docker"), h.home("Apps"));
        let status = strategy.check_status(&mut h.ctx()).unwrap();
        assert_eq!(status, StatusReport::installed("27.1.1"));
    }

    #[test]
    fn mac_install_copies_app_from_image() {
        let mut h = Harness::mac(MockRunner::new());
        let mount = h.home("Volumes/Docker");
        std::fs::create_dir_all(mount.join("Docker.app")).unwrap();
        let apps = h.home("Applications");
        let strategy = DockerMacOs::with_paths(&mount, &apps);

        let result = strategy.install(&mut h.ctx(), &InstallOptions::default()).unwrap();

        assert!(result.success, "{:?}", result);
        assert_eq!(h.downloads.urls(), vec![DMG_URL_ARM64]);
        let attach = h.runner.position("hdiutil attach").unwrap();
        let copy = h.runner.position("cp -R").unwrap();
        let detach = h.runner.commands().iter().rposition(|c| c.starts_with("hdiutil detach")).unwrap();
        assert!(attach < copy && copy < detach);
        assert!(!h.home("tmp/docker-install").exists());
        assert!(h.ui.has_success("Docker is already running"));
    }

    #[test]
    fn mac_download_failure_names_manual_url() {
        let mut h = Harness::mac(MockRunner::new())
            .downloads(MockDownloader::new().fail_status("https://desktop.docker.com", 503));
        let strategy = DockerMacOs::with_paths(h.home("Volumes/Docker"), h.home("Applications"));
        let result = strategy.install(&mut h.ctx(), &InstallOptions::default()).unwrap();

        assert!(!result.success);
        assert_eq!(result.message, "Failed to download Docker Desktop");
        assert!(result.errors.iter().any(|e| e.contains(DOCKER_DESKTOP_URL)));
        assert!(!h.runner.ran("hdiutil"));
        assert!(!h.home("tmp/docker-install").exists());
    }

    #[test]
    fn mac_missing_app_in_image_still_detaches() {
        let mut h = Harness::mac(MockRunner::new());
        let strategy = DockerMacOs::with_paths(h.home("Volumes/Docker"), h.home("Applications"));
        let result = strategy.install(&mut h.ctx(), &InstallOptions::default()).unwrap();

        assert!(!result.success);
        assert_eq!(result.message, "Docker.app not found in the disk image");
        assert!(h.runner.ran("hdiutil detach"));
    }

    #[test]
    fn mac_waits_for_daemon_after_launch() {
        let runner = MockRunner::new().fail_on("docker info", "Cannot connect to the Docker daemon");
        let mut h = Harness::mac(runner);
        let mount = h.home("Volumes/Docker");
        std::fs::create_dir_all(mount.join("Docker.app")).unwrap();
        let strategy = DockerMacOs::with_paths(&mount, h.home("Applications"));

        let result = strategy.install(&mut h.ctx(), &InstallOptions::default()).unwrap();

        assert!(result.success);
        assert!(h.runner.ran("open -a Docker"));
        let polls = h.runner.commands().iter().filter(|c| *c == "docker info").count();
        assert_eq!(polls, START_ATTEMPTS + 1);
        assert!(result.warnings.iter().any(|w| w.contains("still starting")));
    }

    #[test]
    fn mac_uninstall_removes_data_only_on_request() {
        let mut h = Harness::mac(MockRunner::new());
        let apps = h.home("Applications");
        std::fs::create_dir_all(apps.join("Docker.app")).unwrap();
        let data = h.touch("Library/Containers/com.docker.docker/state");
        let strategy = DockerMacOs::with_paths(h.home("Volumes/Docker"), &apps);

        strategy.uninstall(&mut h.ctx(), &UninstallOptions::default()).unwrap();
        assert!(!apps.join("Docker.app").exists());
        assert!(data.exists());

        let options = UninstallOptions {
            remove_data: true,
            ..Default::default()
        };
        let result = strategy.uninstall(&mut h.ctx(), &options).unwrap();
        assert!(result.success);
        assert!(!h.home("Library/Containers/com.docker.docker").exists());
    }
}
