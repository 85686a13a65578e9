// ABOUTME: Build script compiling the adapter's gRPC definitions.
// ABOUTME: Uses a vendored protoc so builds do not need a system install.

fn main() {
    let protoc = protoc_bin_vendored::protoc_bin_path().expect("failed to locate protoc");
    // SAFETY: build scripts are single-threaded.
    unsafe { std::env::set_var("PROTOC", protoc) };

    println!("cargo:rerun-if-changed=proto/compose_adapter.proto");

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile(&["proto/compose_adapter.proto"], &["proto"])
        .expect("failed to compile gRPC definitions");
}
