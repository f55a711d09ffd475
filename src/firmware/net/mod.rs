mod http;
mod wifi;

use embassy_net::{Runner, StackResources};
use esp_hal::rng::Rng;
use esp_radio::wifi::{InternalWifiError, WifiDevice, WifiError};
use static_cell::StaticCell;

pub(crate) use http::TcpTransport;
pub(crate) use wifi::EspRadio;

// DHCP and DNS sockets plus one TCP socket for the store.
const STACK_SOCKETS: usize = 3;

pub(crate) struct NetRuntime {
    pub(crate) radio: EspRadio,
    pub(crate) transport: TcpTransport,
    pub(crate) net_runner: Runner<'static, WifiDevice<'static>>,
}

pub(crate) fn setup(wifi: esp_hal::peripherals::WIFI<'static>) -> Result<NetRuntime, &'static str> {
    static RADIO_CTRL: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
    static STACK_RESOURCES: StaticCell<StackResources<STACK_SOCKETS>> = StaticCell::new();

    let radio_ctrl = esp_radio::init().map_err(|err| {
        esp_println::println!("net: esp_radio::init err={:?}", err);
        "net: esp_radio::init failed"
    })?;
    let radio_ctrl = RADIO_CTRL.init(radio_ctrl);
    let (controller, ifaces) = esp_radio::wifi::new(radio_ctrl, wifi, wifi::wifi_runtime_config())
        .map_err(|err| match err {
            WifiError::InvalidArguments => "net: wifi init failed invalid_args",
            WifiError::Unsupported => "net: wifi init failed unsupported",
            WifiError::NotInitialized => "net: wifi init failed not_initialized",
            WifiError::InternalError(InternalWifiError::NoMem) => "net: wifi init failed no_mem",
            _ => "net: wifi init failed other",
        })?;
    let mac = ifaces.sta.mac_address();

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    let (stack, net_runner) = embassy_net::new(
        ifaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        STACK_RESOURCES.init(StackResources::<STACK_SOCKETS>::new()),
        seed,
    );

    Ok(NetRuntime {
        radio: EspRadio::new(controller, stack, mac),
        transport: TcpTransport::new(stack),
        net_runner,
    })
}

#[embassy_executor::task]
pub(crate) async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}
