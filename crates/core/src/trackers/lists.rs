//! Built-in tracker lists.

pub const EXTRA_TRACKERS: &[&str] = &[
    "udp://47.ip-51-68-199.eu:6969/announce",
    "udp://exodus.desync.com:6969/announce",
    "udp://explodie.org:6969/announce",
    "udp://open.stealth.si:80/announce",
    "udp://opentracker.i2p.rocks:6969/announce",
    "udp://tracker.dler.org:6969/announce",
    "udp://tracker.internetwarriors.net:1337",
    "udp://tracker.openbittorrent.com:6969/announce",
    "udp://tracker.opentrackr.org:1337/announce",
    "udp://tracker.tiny-vps.com:6969/announce",
    "udp://tracker.torrent.eu.org:451/announce",
    "udp://valakas.rollo.dnsabr.com:2710/announce",
    "udp://www.torrent.eu.org:451/announce",
    "udp://open.demonii.com:1337/announce",
    "http://tracker.openbittorrent.com:80/announce",
    "udp://uploads.gamecoast.net:6969/announce",
    "udp://tracker1.bt.moack.co.kr:80/announce",
    "udp://tracker.theoks.net:6969/announce",
    "udp://tracker.ccp.ovh:6969/announce",
    "udp://tracker.bittor.pw:1337/announce",
    "udp://tracker.4.babico.name.tr:3131/announce",
    "udp://thouvenin.cloud:6969/announce",
    "udp://sanincode.com:6969/announce",
    "udp://retracker01-msk-virt.corbina.net:80/announce",
    "udp://private.anonseed.com:6969/announce",
    "udp://p4p.arenabg.com:1337/announce",
];

pub const RUSSIAN_TRACKERS: &[&str] = &[
    "udp://opentor.net:6969",
    "http://bt.t-ru.org/ann?magnet",
    "http://bt2.t-ru.org/ann?magnet",
    "http://bt3.t-ru.org/ann?magnet",
    "http://bt4.t-ru.org/ann?magnet",
];

/// Always blacklisted when blacklisting is enabled; these hosts do not resolve.
pub const BLACKLIST_TRACKERS: &[&str] = &[
    "udp://ipv4.tracker.harry.lu:80/announce",
    "http://ipv4.tracker.harry.lu:80/announce",
    "udp://ipv6.tracker.harry.lu:80/announce",
    "http://ipv6.tracker.harry.lu:80/announce",
];
