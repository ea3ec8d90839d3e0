use h3native_lib::platform::{SystemProperties, detect_architecture, detect_operating_system};
use h3native_lib::{OperatingSystem, PlatformKey};
use serial_test::serial;
use temp_env::with_vars;

fn props(vendor: &str, os_name: &str, arch: &str) -> SystemProperties {
  SystemProperties {
    vendor: vendor.to_string(),
    os_name: os_name.to_string(),
    arch: arch.to_string(),
  }
}

#[test]
fn typical_hosts_map_to_their_resource_directories() {
  let cases = [
    (props("Oracle Corporation", "Linux", "amd64"), "linux-x64"),
    (props("Apple Inc.", "Mac OS X", "aarch64"), "darwin-arm64"),
    (props("Microsoft", "Windows 10", "x86"), "windows-x86"),
    (props("FreeBSD Foundation", "FreeBSD", "amd64"), "freebsd-x64"),
    (props("The Android Project", "Linux", "aarch64"), "android-arm64"),
    (props("unknown", "SunOS", "sparcv9"), "linux-sparcv9"),
  ];

  for (props, expected) in cases {
    assert_eq!(PlatformKey::detect(&props).dir_name(), expected, "{props:?}");
  }
}

#[test]
fn the_running_host_detects_a_key() {
  let key = PlatformKey::detect(&SystemProperties::current());
  assert!(!key.arch.as_str().is_empty());

  #[cfg(target_os = "linux")]
  assert_eq!(key.os, OperatingSystem::Linux);
  #[cfg(target_os = "macos")]
  assert_eq!(key.os, OperatingSystem::Darwin);
  #[cfg(windows)]
  assert_eq!(key.os, OperatingSystem::Windows);
  #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
  assert_eq!(key.dir_name(), "linux-x64");
}

#[test]
#[serial]
fn detection_ignores_the_process_locale() {
  with_vars(
    [
      ("LC_ALL", Some("tr_TR.UTF-8")),
      ("LANG", Some("tr_TR.UTF-8")),
      ("LC_CTYPE", Some("tr_TR.UTF-8")),
    ],
    || {
      // Dotted and dotless i would fold differently under Turkish rules.
      assert_eq!(detect_operating_system("", "WINDOWS"), OperatingSystem::Windows);
      assert_eq!(detect_operating_system("", "FREEBSD"), OperatingSystem::FreeBsd);
      assert_eq!(detect_operating_system("ANDROID", "LINUX"), OperatingSystem::Android);
      assert_eq!(OperatingSystem::Windows.dir_name(), "windows");
      assert_eq!(detect_architecture("I686").as_str(), "I686");
      assert_eq!(detect_architecture("i686").as_str(), "x86");
    },
  );
}

#[test]
fn every_os_has_a_lowercase_directory_and_suffix() {
  for os in OperatingSystem::ALL {
    let dir = os.dir_name();
    assert_eq!(dir, dir.to_ascii_lowercase());
    assert!(os.library_suffix().starts_with('.'));
  }
}
