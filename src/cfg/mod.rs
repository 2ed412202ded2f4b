pub mod modem_cfg;
