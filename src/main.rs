fn main() -> std::process::ExitCode {
    cursor_balance_lib::run()
}
